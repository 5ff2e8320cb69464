#[cfg(test)]
mod scanner_tests {
    use pretty_assertions::assert_eq;

    use rox::error::{LoxError, Position, Span};
    use rox::scanner::*;
    use rox::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source.as_bytes());
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_operators_and_keywords() {
        assert_token_sequence(
            "var x = !a != b == c <= 1 >= 2; fun f() { return nil; }",
            &[
                (TokenType::VAR, "var"),
                (TokenType::IDENTIFIER, "x"),
                (TokenType::EQUAL, "="),
                (TokenType::BANG, "!"),
                (TokenType::IDENTIFIER, "a"),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::IDENTIFIER, "b"),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::IDENTIFIER, "c"),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::NUMBER(1.0), "1"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::NUMBER(2.0), "2"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::FUN, "fun"),
                (TokenType::IDENTIFIER, "f"),
                (TokenType::LEFT_PAREN, "("),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::RETURN, "return"),
                (TokenType::NIL, "nil"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_comments_are_skipped() {
        assert_token_sequence(
            "1 // the rest is ignored ( ) {\n/ 2",
            &[
                (TokenType::NUMBER(1.0), "1"),
                (TokenType::SLASH, "/"),
                (TokenType::NUMBER(2.0), "2"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_literal_payloads() {
        let tokens = Scanner::new(br#"12.5 "hi there" 7."#).scan_tokens().unwrap();

        match &tokens[0].token_type {
            TokenType::NUMBER(n) => assert_eq!(*n, 12.5),
            other => panic!("expected number, got {:?}", other),
        }
        match &tokens[1].token_type {
            TokenType::STRING(s) => assert_eq!(s, "hi there"),
            other => panic!("expected string, got {:?}", other),
        }

        // A trailing dot is not part of the number.
        assert_eq!(tokens[2].lexeme, "7");
        assert_eq!(tokens[3].token_type, TokenType::DOT);
    }

    #[test]
    fn test_token_display() {
        let tokens = Scanner::new(br#"var n = 3; "s" 1.5"#).scan_tokens().unwrap();
        let lines: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();

        assert_eq!(
            lines,
            vec![
                "VAR var null",
                "IDENTIFIER n null",
                "EQUAL = null",
                "NUMBER 3 3.0",
                "SEMICOLON ; null",
                "STRING \"s\" s",
                "NUMBER 1.5 1.5",
                "EOF  null",
            ]
        );
    }

    #[test]
    fn test_positions_track_lines_and_columns() {
        let tokens = Scanner::new(b"var a;\n  print a;").scan_tokens().unwrap();

        let positions: Vec<(usize, usize)> = tokens.iter().map(|t| (t.line, t.column)).collect();

        assert_eq!(
            positions,
            vec![(1, 1), (1, 5), (1, 6), (2, 3), (2, 9), (2, 10), (2, 11)]
        );
    }

    #[test]
    fn test_multi_line_string_advances_line() {
        let tokens = Scanner::new(b"\"a\nb\" x").scan_tokens().unwrap();

        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].lexeme, "x");
        assert_eq!(tokens[1].line, 2);
        assert_eq!(tokens[1].column, 4);
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let source = ",.$(#";
        let scanner = Scanner::new(source.as_bytes());

        // Collect all results (both tokens and errors)
        let results: Vec<_> = scanner.collect();

        // 0: COMMA ','
        // 1: DOT '.'
        // 2: Error for '$'
        // 3: LEFT_PAREN '('
        // 4: Error for '#'
        // 5: EOF
        assert_eq!(results.len(), 6, "Expected 6 items in result");

        assert_token_matches(&results[0], TokenType::COMMA, ",");
        assert_token_matches(&results[1], TokenType::DOT, ".");
        assert_token_matches(&results[3], TokenType::LEFT_PAREN, "(");
        assert_token_matches(&results[5], TokenType::EOF, "");

        let errors: Vec<String> = results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .map(|e| e.message())
            .collect();

        assert_eq!(
            errors,
            vec!["Unexpected character: '$'", "Unexpected character: '#'"]
        );

        // Helper function
        fn assert_token_matches(
            result: &Result<Token, LoxError>,
            expected_type: TokenType,
            expected_lexeme: &str,
        ) {
            match result {
                Ok(token) => {
                    assert_eq!(
                        token.token_type, expected_type,
                        "Expected token type {:?}, got {:?}",
                        expected_type, token.token_type
                    );
                    assert_eq!(
                        token.lexeme, expected_lexeme,
                        "Expected lexeme '{}', got '{}'",
                        expected_lexeme, token.lexeme
                    );
                }
                Err(e) => panic!("Expected token but got error: {}", e),
            }
        }
    }

    #[test]
    fn test_scan_tokens_collects_every_error() {
        let errors = Scanner::new(b"@\n\"open").scan_tokens().unwrap_err();

        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0].span(),
            Some(Span::new(Position::new(1, 1), Position::new(1, 1)))
        );
        assert_eq!(errors[0].to_string(), "[1:1-1:1]: Unexpected character: '@'");
        assert_eq!(errors[1].message(), "Unterminated string.");
        assert!(errors.iter().all(LoxError::is_static));
    }

    #[test]
    fn test_multi_byte_character_is_one_error() {
        let errors = Scanner::new("é".as_bytes()).scan_tokens().unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message(), "Unexpected character: 'é'");
    }

    #[test]
    fn test_scanner_is_fused() {
        let mut scanner = Scanner::new(b"");

        assert!(matches!(scanner.next(), Some(Ok(ref t)) if t.token_type == TokenType::EOF));
        assert!(scanner.next().is_none());
        assert!(scanner.next().is_none());
    }
}
