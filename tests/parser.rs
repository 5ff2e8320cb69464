#[cfg(test)]
mod parser_tests {
    use pretty_assertions::assert_eq;

    use rox::ast::{Expr, InvalidExpr, LiteralValue, Stmt};
    use rox::lox::{parse_source, scan_source};
    use rox::parser::Parser;
    use rox::printer::{AstPrinter, RpnPrinter, SourcePrinter};

    fn expr(source: &str) -> Expr {
        let tokens = scan_source(source).expect("source should scan");
        Parser::new(tokens)
            .parse_expression()
            .expect("expression should parse")
    }

    fn ast(source: &str) -> String {
        AstPrinter::print(&expr(source))
    }

    fn rpn(source: &str) -> String {
        RpnPrinter::print(&expr(source))
    }

    fn errors(source: &str) -> Vec<String> {
        parse_source(source)
            .expect_err("program should not parse")
            .iter()
            .map(|e| e.message())
            .collect()
    }

    #[test]
    fn test_precedence_and_grouping() {
        assert_eq!(ast("1 + 2 * 3"), "(+ 1 (* 2 3))");
        assert_eq!(ast("(1 + 2) * 3"), "(* (group (+ 1 2)) 3)");
        assert_eq!(ast("1 - 2 - 3"), "(- (- 1 2) 3)");
        assert_eq!(ast("!true == false"), "(== (! true) false)");
        assert_eq!(ast("1 < 2 == 3 >= 4"), "(== (< 1 2) (>= 3 4))");
    }

    #[test]
    fn test_nested_unary() {
        assert_eq!(ast("--42"), "(- (- 42))");
        assert_eq!(ast("!!nil"), "(! (! nil))");
    }

    #[test]
    fn test_literals_logical_and_calls() {
        assert_eq!(ast(r#""a" + nil"#), r#"(+ "a" nil)"#);
        assert_eq!(ast("2.5"), "2.5");
        assert_eq!(ast("a or b and c"), "(or a (and b c))");
        assert_eq!(ast("a = b = 1"), "(= a (= b 1))");
        assert_eq!(ast("f(1)(2, x)"), "(call (call f 1) 2 x)");
        assert_eq!(ast("fun (a, b) { return a; }"), "(fun anonymous (a b))");
    }

    #[test]
    fn test_reverse_polish() {
        assert_eq!(rpn("(1 + 2) * 3"), "1 2 + 3 *");
        assert_eq!(rpn("-4"), "4 -");
        assert_eq!(rpn("f(1, 2)"), "1 2 call::f");
        assert_eq!(rpn("x = 1 + 2"), "x 1 2 + =");
    }

    #[test]
    fn test_missing_left_operand_is_recovered() {
        let tokens = scan_source("* 3").unwrap();
        let mut parser = Parser::new(tokens);
        let tree = parser.parse_expression().unwrap();

        assert_eq!(
            AstPrinter::print(&tree),
            "<<Error: Missing left-hand operand for '*' operator>>"
        );
        assert_eq!(parser.diagnostics().len(), 1);
        assert!(parser.diagnostics()[0].is_static());
    }

    #[test]
    fn test_missing_left_operand_takes_operand_at_operator_precedence() {
        match expr("== 1 + 2") {
            Expr::Invalid(InvalidExpr::Unary {
                operator, right, ..
            }) => {
                assert_eq!(operator.lexeme, "==");
                assert_eq!(AstPrinter::print(&right), "(+ 1 2)");
            }
            other => panic!("expected an invalid node, got {:?}", other),
        }

        // `+` binds looser than `*`, so the product is its operand.
        match expr("+ 2 * 3") {
            Expr::Invalid(InvalidExpr::Unary { right, .. }) => {
                assert_eq!(AstPrinter::print(&right), "(* 2 3)");
            }
            other => panic!("expected an invalid node, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_left_operand_fails_a_program() {
        assert_eq!(
            errors("print * 3;"),
            vec!["Missing left-hand operand for '*' operator"]
        );
    }

    #[test]
    fn test_expression_errors() {
        let tokens = scan_source("1 2").unwrap();
        let errs = Parser::new(tokens).parse_expression().unwrap_err();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].message(), "Expected end of expression at '2'");

        let tokens = scan_source("(1 + 2").unwrap();
        let errs = Parser::new(tokens).parse_expression().unwrap_err();
        assert_eq!(errs[0].message(), "Expected ')' after expression at end");
    }

    #[test]
    fn test_recovery_reports_every_broken_statement() {
        assert_eq!(
            errors("print 1 +; var = 2; print 3;"),
            vec!["Expected expression at ';'", "Expected variable name at '='"]
        );
    }

    #[test]
    fn test_recovery_leaves_closing_brace_to_its_block() {
        assert_eq!(
            errors("{ print 1 + } print 2;"),
            vec!["Expected expression at '}'"]
        );
        assert_eq!(
            errors("fun f() { var = 1 } print f();"),
            vec!["Expected variable name at '='"]
        );
    }

    #[test]
    fn test_stray_closing_brace_at_top_level() {
        assert_eq!(errors("} print 1;"), vec!["Expected expression at '}'"]);
    }

    #[test]
    fn test_error_location() {
        let errs = parse_source("print ;").unwrap_err();

        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].to_string(), "[1:7-1:7]: Expected expression at ';'");
    }

    #[test]
    fn test_invalid_assignment_target() {
        assert_eq!(errors("1 = 2;"), vec!["Invalid assignment target at '='"]);
        assert_eq!(errors("a + b = c;"), vec!["Invalid assignment target at '='"]);
    }

    #[test]
    fn test_unclosed_block() {
        assert_eq!(errors("{ print 1;"), vec!["Expected '}' after block at end"]);
    }

    #[test]
    fn test_too_many_arguments_is_reported() {
        let args: Vec<String> = (0..256).map(|i| i.to_string()).collect();
        let source = format!("f({});", args.join(", "));

        let errs = errors(&source);
        assert_eq!(errs.len(), 1);
        assert!(errs[0].starts_with("Cannot have more than 255 arguments"));
    }

    #[test]
    fn test_for_loop_is_desugared() {
        let program = parse_source("for (var i = 0; i < 3; i = i + 1) print i;").unwrap();

        assert_eq!(program.len(), 1);
        assert_eq!(
            SourcePrinter::program(&program),
            "{ var i = 0; while (i < 3) { print i; i = i + 1; } }"
        );

        let program = parse_source("for (;;) print 1;").unwrap();
        match &program[..] {
            [Stmt::Block(inner)] => match &inner[..] {
                [Stmt::While { condition, .. }] => assert!(matches!(
                    condition,
                    Expr::Literal {
                        value: LiteralValue::True,
                        ..
                    }
                )),
                other => panic!("expected a lone while, got {:?}", other),
            },
            other => panic!("expected a block, got {:?}", other),
        }
    }

    #[test]
    fn test_function_declaration_and_lambda() {
        let program =
            parse_source("fun add(a, b) { return a + b; } var f = fun (x) { return x; };")
                .unwrap();

        match &program[..] {
            [Stmt::Function { name, fun }, Stmt::Var {
                initializer: Some(Expr::Fun(lambda)),
                ..
            }] => {
                assert_eq!(name.lexeme, "add");
                assert_eq!(fun.params.len(), 2);
                assert_eq!(fun.body.len(), 1);
                assert!(lambda.name.is_none());
                assert_eq!(lambda.display_name(), "anonymous");
            }
            other => panic!("unexpected program shape: {:?}", other),
        }
    }

    #[test]
    fn test_source_printer_round_trip() {
        let source = r#"
            var greeting = "hi";
            fun counter(step) {
                var n = 0;
                return fun () { n = n + step; return n; };
            }
            if (!(1 < 2) or nil) print -greeting; else { print "no"; }
            while (false and true) {}
            var twice = fun apply(f, x) { return f(f(x)); };
            print twice(counter(2), 3) * (4 - 1) / 2;
        "#;

        let first = SourcePrinter::program(&parse_source(source).unwrap());
        let second = SourcePrinter::program(&parse_source(&first).unwrap());

        assert_eq!(first, second);
        assert!(first.contains("if (!(1 < 2) or nil) print -greeting; else { print \"no\"; }"));
        assert!(first.contains("while (false and true) {}"));
    }
}
