// Integration tests for the C interpreter

use ouroboros::{Error, ErrorKind, Interpreter, InterpreterConfig, MockTerminal, Value};

fn run(source: &str) -> Vec<Value> {
    let mut interpreter = Interpreter::new();
    interpreter.interpret(source).expect("Execution failed")
}

fn run_with_output(source: &str) -> (Vec<Value>, Vec<String>) {
    let mut interpreter = Interpreter::new();
    let results = interpreter.interpret(source).expect("Execution failed");
    let output = interpreter.terminal().get_output();
    (results, output)
}

fn runtime_error(source: &str) -> ErrorKind {
    let mut interpreter = Interpreter::new();
    match interpreter.interpret(source) {
        Err(Error::Runtime(e)) => e.kind,
        other => panic!("Expected runtime error, got {:?}", other),
    }
}

#[test]
fn test_simple_arithmetic() {
    let source = r#"
        int main() {
            int x = 5;
            int y = 10;
            int z = x + y;
            return z;
        }
    "#;

    assert_eq!(run(source).last(), Some(&Value::Int(15)));
}

#[test]
fn test_function_call() {
    let source = r#"
        int add(int a, int b) {
            return a + b;
        }

        int main() {
            int result = add(3, 4);
            return result;
        }
    "#;

    assert_eq!(run(source).last(), Some(&Value::Int(7)));
}

#[test]
fn test_top_level_statements_produce_results() {
    let results = run("int x = 2; x * 21; x = 5; int y;");
    assert_eq!(results, vec![Value::Int(2), Value::Int(42), Value::Int(5)]);
}

// === RECURSION ===

#[test]
fn test_fibonacci() {
    let source = r#"
        int fibonacci(int n) {
            if (n <= 1) {
                return n;
            }
            return fibonacci(n - 1) + fibonacci(n - 2);
        }
        int main() {
            return fibonacci(7);
        }
    "#;

    assert_eq!(run(source).last(), Some(&Value::Int(13)));
}

#[test]
fn test_factorial() {
    let source = r#"
        int factorial(int n) {
            if (n <= 1) return 1;
            return n * factorial(n - 1);
        }
        int main() { return factorial(5); }
    "#;

    assert_eq!(run(source).last(), Some(&Value::Int(120)));
}

#[test]
fn test_unbounded_recursion_is_stack_overflow() {
    let source = "int forever(int n) { return forever(n + 1); } forever(0);";
    let config = InterpreterConfig::default().with_max_call_depth(32);
    let mut interpreter = Interpreter::with_terminal(MockTerminal::new(), config);

    match interpreter.interpret(source) {
        Err(Error::Runtime(e)) => assert_eq!(e.kind, ErrorKind::StackOverflow),
        other => panic!("Expected stack overflow, got {:?}", other),
    }
}

#[test]
fn test_default_depth_allows_deep_recursion() {
    let source = r#"
        int sum(int n) {
            if (n == 0) return 0;
            return n + sum(n - 1);
        }
        sum(50);
    "#;

    assert_eq!(run(source), vec![Value::Int(1275)]);
}

/// Run `source` with default limits on a thread with a 2 MB stack,
/// returning the last result as an integer
fn run_on_small_stack(source: &'static str) -> Result<Option<i64>, Error> {
    std::thread::Builder::new()
        .stack_size(2 << 20)
        .spawn(move || -> Result<Option<i64>, Error> {
            let results = Interpreter::new().interpret(source)?;
            Ok(results.last().and_then(Value::as_int))
        })
        .expect("Failed to spawn interpreter thread")
        .join()
        .expect("Interpreter thread crashed")
}

#[test]
fn test_default_depth_limit_fires_on_small_stack() {
    let source = "int f(int n) { return f(n + 1) + 1; } int main() { return f(0); }";

    match run_on_small_stack(source) {
        Err(Error::Runtime(e)) => assert_eq!(e.kind, ErrorKind::StackOverflow),
        other => panic!("Expected stack overflow, got {:?}", other),
    }
}

#[test]
fn test_recursion_near_default_limit_on_small_stack() {
    let source = r#"
        int sum(int n) {
            if (n == 0) return 0;
            return n + sum(n - 1);
        }
        sum(250);
    "#;

    assert_eq!(run_on_small_stack(source), Ok(Some(31375)));
}

// === END-TO-END PROGRAMS ===

#[test]
fn test_gcd_program() {
    let source = r#"
        int gcd(int a,int b){while(b!=0){int t=b;b=a%b;a=t;}return a;}
        int main(){return gcd(48,18);}
    "#;
    assert_eq!(run(source).last(), Some(&Value::Int(6)));
}

#[test]
fn test_array_program() {
    let source = "int main(){int arr[3]={1,2,3}; arr[1]=arr[1]+10; return arr[1];}";
    assert_eq!(run(source).last(), Some(&Value::Int(12)));
}

#[test]
fn test_malloc_program() {
    let source = r#"
        int main(){int*p=malloc(2*4); p[0]=5; p[1]=7; int s=p[0]+p[1]; free(p); return s;}
    "#;
    assert_eq!(run(source).last(), Some(&Value::Int(12)));
}

#[test]
fn test_bubble_sort() {
    let source = r#"
        int main() {
            int arr[5] = {5, 1, 4, 2, 3};
            for (int i = 0; i < 4; i++) {
                for (int j = 0; j < 4 - i; j++) {
                    if (arr[j] > arr[j + 1]) {
                        int temp = arr[j];
                        arr[j] = arr[j + 1];
                        arr[j + 1] = temp;
                    }
                }
            }
            printf("%d %d %d %d %d\n", arr[0], arr[1], arr[2], arr[3], arr[4]);
            return arr[4];
        }
    "#;

    let (results, output) = run_with_output(source);
    assert_eq!(output, vec!["1 2 3 4 5"]);
    assert_eq!(results.last(), Some(&Value::Int(5)));
}

#[test]
fn test_matrix_program() {
    let source = r#"
        int m[2][3] = {{1, 2, 3}, {4, 5, 6}};
        int total = 0;
        int i = 0;
        while (i < 2) {
            int j = 0;
            while (j < 3) {
                total += m[i][j];
                j++;
            }
            i++;
        }
        total;
    "#;

    assert_eq!(run(source).last(), Some(&Value::Int(21)));
}

// === SCOPING ===

#[test]
fn test_block_assignment_shadows_outer_variable() {
    let source = r#"
        int x = 1;
        {
            x = 2;
            x;
        }
        x;
    "#;

    assert_eq!(run(source), vec![Value::Int(1), Value::Int(2), Value::Int(1)]);
}

#[test]
fn test_for_body_writes_stay_in_loop_frame() {
    let source = r#"
        int total = 0;
        for (int i = 0; i < 3; i++) {
            total = total + 10;
        }
        total;
    "#;

    assert_eq!(run(source).last(), Some(&Value::Int(0)));
}

#[test]
fn test_while_body_writes_are_visible() {
    let source = "int n = 0; while (n < 4) { n++; } n;";
    assert_eq!(run(source).last(), Some(&Value::Int(4)));
}

#[test]
fn test_break_and_continue() {
    let source = r#"
        int hits[1];
        for (int i = 0; i < 10; i++) {
            if (i % 2 == 0) continue;
            if (i > 7) break;
            hits[0] += i;
        }
        hits[0];
    "#;

    // 1 + 3 + 5 + 7
    assert_eq!(run(source).last(), Some(&Value::Int(16)));
}

// === HEAP ===

#[test]
fn test_heap_use_after_free_error() {
    let source = r#"
        int main() {
            int *p = malloc(2);
            p[0] = 1;
            free(p);
            return p[0];
        }
    "#;

    assert_eq!(runtime_error(source), ErrorKind::UseAfterFree);
}

#[test]
fn test_heap_write_after_free_error() {
    assert_eq!(
        runtime_error("int *p = malloc(1); free(p); *p = 3;"),
        ErrorKind::UseAfterFree
    );
}

#[test]
fn test_heap_double_free_error() {
    let source = r#"
        int main() {
            int *p = malloc(4);
            free(p);
            free(p);
            return 0;
        }
    "#;

    assert_eq!(runtime_error(source), ErrorKind::DoubleFree);
}

#[test]
fn test_heap_null_dereference() {
    assert_eq!(runtime_error("int *p = 0; *p;"), ErrorKind::InvalidAddress);
}

#[test]
fn test_heap_out_of_bounds() {
    assert_eq!(runtime_error("int *p = malloc(2); p[2] = 1;"), ErrorKind::InvalidAddress);
    assert_eq!(runtime_error("malloc(0);"), ErrorKind::InvalidSize);
}

#[test]
fn test_realloc_keeps_contents() {
    let source = r#"
        int *p = malloc(2);
        p[0] = 3;
        p[1] = 4;
        p = realloc(p, 4);
        p[3] = 5;
        p[0] + p[1] + p[3];
    "#;

    assert_eq!(run(source).last(), Some(&Value::Int(12)));
}

#[test]
fn test_pointer_arithmetic() {
    let source = r#"
        int *base = malloc(5);
        int *p = base + 2;
        *p = 42;
        int *end = base + 4;
        base[2] + (end - base);
    "#;

    assert_eq!(run(source).last(), Some(&Value::Int(46)));
}

// === ERRORS ===

#[test]
fn test_division_truncates_toward_zero() {
    assert_eq!(run("-7 / 2;"), vec![Value::Int(-3)]);
    assert_eq!(run("-7 % 2;"), vec![Value::Int(-1)]);
    assert_eq!(runtime_error("int z = 0; 5 / z;"), ErrorKind::DivisionByZero);
    assert_eq!(runtime_error("1.0 / 0;"), ErrorKind::DivisionByZero);
}

#[test]
fn test_undefined_names() {
    assert_eq!(runtime_error("y + 1;"), ErrorKind::UndefinedVariable);
    assert_eq!(runtime_error("launch(1);"), ErrorKind::UndefinedFunction);
}

#[test]
fn test_errors_carry_lines() {
    let mut interpreter = Interpreter::new();
    let err = interpreter
        .interpret("int a = 1;\nint b = 0;\na / b;")
        .expect_err("division should fail");
    assert_eq!(err.line(), 3);

    let err = Interpreter::new()
        .interpret("int x = ;")
        .expect_err("parse should fail");
    assert!(matches!(err, Error::Parse(_)), "got {:?}", err);

    let err = Interpreter::new()
        .interpret("int x = 1 @ 2;")
        .expect_err("lex should fail");
    assert!(matches!(err, Error::Lex(_)), "got {:?}", err);
}

// === CONSOLE ===

#[test]
fn test_printf_output() {
    let (results, output) = run_with_output(
        r#"
        int main() {
            printf("%d|%5.2f|%c|%s|%x\n", 42, 3.14159, 'z', "str", 255);
            printf("%-4d|%04d|%%\n", 7, 7);
            return 0;
        }
    "#,
    );

    assert_eq!(output, vec!["42| 3.14|z|str|ff", "7   |0007|%"]);
    assert_eq!(results.last(), Some(&Value::Int(0)));
}

#[test]
fn test_scanf_reads_terminal_input() {
    let source = r#"
        int main() {
            int a;
            int b;
            int n = scanf("%d %d", &a, &b);
            printf("%d items, sum %d\n", n, a + b);
            return a * b;
        }
    "#;

    let terminal = MockTerminal::with_input(["6 7"]);
    let mut interpreter = Interpreter::with_terminal(terminal, InterpreterConfig::default());
    let results = interpreter.interpret(source).expect("Execution failed");

    assert_eq!(interpreter.terminal().get_output(), vec!["2 items, sum 13"]);
    assert_eq!(results.last(), Some(&Value::Int(42)));
}

#[test]
fn test_gets_and_puts() {
    let source = r#"
        char *line = gets();
        puts(line);
        strlen(line);
    "#;

    let terminal = MockTerminal::with_input(["echo me"]);
    let mut interpreter = Interpreter::with_terminal(terminal, InterpreterConfig::default());
    let results = interpreter.interpret(source).expect("Execution failed");

    assert_eq!(interpreter.terminal().get_output(), vec!["echo me"]);
    assert_eq!(results.last(), Some(&Value::Int(7)));
}
