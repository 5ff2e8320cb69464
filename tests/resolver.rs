#[cfg(test)]
mod resolver_tests {
    use pretty_assertions::assert_eq;

    use rox::ast::Stmt;
    use rox::lox::parse_source;
    use rox::resolver::{ResolutionTable, Resolver};

    fn program(source: &str) -> Vec<Stmt> {
        parse_source(source).expect("program should parse")
    }

    fn resolve(statements: &[Stmt]) -> Result<ResolutionTable, Vec<String>> {
        Resolver::new()
            .resolve(statements)
            .map_err(|errs| errs.iter().map(|e| e.message()).collect())
    }

    /// Recorded distances, smallest first.
    fn distances(source: &str) -> Vec<usize> {
        let statements = program(source);
        let table = resolve(&statements).expect("program should resolve");

        let mut hops: Vec<usize> = table.values().copied().collect();
        hops.sort_unstable();
        hops
    }

    fn resolve_errors(source: &str) -> Vec<String> {
        let statements = program(source);
        resolve(&statements).expect_err("program should be rejected")
    }

    #[test]
    fn test_globals_are_not_recorded() {
        assert_eq!(distances("var g = 1; print g; g = 2;"), Vec::<usize>::new());
    }

    #[test]
    fn test_block_distances() {
        assert_eq!(distances("{ var a = 1; print a; }"), vec![0]);
        assert_eq!(distances("{ var a = 1; { print a; } }"), vec![1]);
        assert_eq!(distances("{ var a = 1; { { a = 2; } } }"), vec![2]);
    }

    #[test]
    fn test_function_distances() {
        assert_eq!(distances("fun f(x) { return x; }"), vec![0]);
        assert_eq!(
            distances("fun outer() { var a = 1; fun inner() { return a; } }"),
            vec![1]
        );
    }

    #[test]
    fn test_named_lambda_sees_its_own_name() {
        // `n` is a parameter; `fact` lives one scope further out.
        assert_eq!(
            distances("var f = fun fact(n) { return fact(n); };"),
            vec![0, 1]
        );
    }

    #[test]
    fn test_shadowing_is_allowed() {
        assert!(resolve(&program("var a = 1; { var a = 2; print a; }")).is_ok());
        assert!(resolve(&program("var a = 1; var a = 2;")).is_ok());
        assert!(resolve(&program("var a = a;")).is_ok());
    }

    #[test]
    fn test_read_in_own_initializer() {
        assert_eq!(
            resolve_errors("{ var a = a; }"),
            vec!["Can't read local variable 'a' in its own initializer."]
        );
        assert_eq!(
            resolve_errors("var a = 1; { var a = a + 1; }"),
            vec!["Can't read local variable 'a' in its own initializer."]
        );
    }

    #[test]
    fn test_local_closure_may_call_its_own_variable() {
        let table = resolve(&program(
            "{ var f = fun (n) { if (n < 1) return 0; return f(n - 1); }; print f(3); }",
        ))
        .expect("recursive local closure should resolve");

        // `n` twice inside the body, `f` from the body (1 hop) and from the block (0).
        let mut hops: Vec<usize> = table.values().copied().collect();
        hops.sort_unstable();
        assert_eq!(hops, vec![0, 0, 0, 1]);
    }

    #[test]
    fn test_redeclaration_in_local_scope() {
        assert_eq!(
            resolve_errors("{ var a = 1; var a = 2; }"),
            vec!["Variable named 'a' already declared in this scope."]
        );
        assert_eq!(
            resolve_errors("fun f(a, a) {}"),
            vec!["Variable named 'a' already declared in this scope."]
        );
    }

    #[test]
    fn test_top_level_return() {
        assert_eq!(
            resolve_errors("return 1;"),
            vec!["Can't return from top-level code."]
        );
        assert!(resolve(&program("fun f() { if (true) return; }")).is_ok());
    }

    #[test]
    fn test_every_error_is_collected() {
        let statements = program("return; { var b = b; } { var c; var c; }");
        let errs = Resolver::new().resolve(&statements).unwrap_err();

        assert_eq!(errs.len(), 3);
        assert!(errs.iter().all(|e| e.is_static()));
    }
}
