//! Edge case tests for tarnc-gen: lowering shapes over real programs.

use crate::generate;
use tarnc_par::parse_source;
use tarnc_util::Handler;

/// Run the whole front end and generate assembly; the source must be
/// error-free.
fn compile(source: &str) -> String {
    let handler = Handler::new();
    let mut program = parse_source(source, &handler);
    let defs = tarnc_sem::analyze(&mut program, &handler);
    tarnc_sem::check(&mut program, &defs, &handler);
    assert!(
        !handler.has_errors(),
        "front end errors: {:?}",
        handler.diagnostics()
    );
    generate(&program, &defs)
}

#[test]
fn test_edge_frame_prologue_and_epilogue() {
    let asm = compile("int main() {\n    int a;\n    a = 3;\n    return 0;\n}");

    assert!(asm.contains("\t.globl main\n"));
    assert!(asm.contains("main:\n"));
    // entry: push $ra, push $fp, fp = sp + 8, reserve one local
    assert!(asm.contains("\tsw\t$ra, 0($sp)\n"));
    assert!(asm.contains("\tsw\t$fp, 0($sp)\n"));
    assert!(asm.contains("\taddu\t$fp, $sp, 8\n"));
    assert!(asm.contains("\tsubu\t$sp, $sp, 4\n"));
    // exit: restore through the control link, then exit syscall for main
    assert!(asm.contains("\tlw\t$ra, 0($fp)\n"));
    assert!(asm.contains("\tlw\t$fp, -4($fp)\n"));
    assert!(asm.contains("\tli\t$v0, 10\n"));
    assert!(asm.contains("\tsyscall\n"));
    // the local lives at -8($fp)
    assert!(asm.contains("\tla\t$t0, -8($fp)\n"));
}

#[test]
fn test_edge_non_main_function_label_and_return() {
    let asm = compile("void f() {\n}\nint main() {\n    f();\n    return 0;\n}");

    assert!(asm.contains("_f:\n"));
    assert!(asm.contains("\tjr\t$ra\n"));
    assert!(asm.contains("\tjal\t_f\n"));
    // zero arguments: nothing to drop at the call site
    assert!(!asm.contains("\taddu\t$sp, $sp, 0\n"));
}

#[test]
fn test_edge_globals_in_data_segment() {
    let asm = compile("int g;\nint main() {\n    g = 1;\n    print << g;\n    return 0;\n}");

    assert!(asm.contains("\t.data\n"));
    assert!(asm.contains("\t.align 2\n"));
    assert!(asm.contains("_g:\t.space 4\n"));
    // store goes through the label address, the read loads it
    assert!(asm.contains("\tla\t$t0, _g\n"));
    assert!(asm.contains("\tlw\t$t0, _g\n"));
}

#[test]
fn test_edge_short_circuit_and() {
    // S4: the right operand must not be evaluated when the left is false
    let asm = compile("bool b;\nint main() {\n    b = tru && fls;\n    return 0;\n}");

    let branch = asm
        .find("\tbeq\t$t0, 0, L0\n")
        .expect("short-circuit branch missing");
    let fls_eval = asm.find("\tli\t$t0, 0\n").expect("fls evaluation missing");
    assert!(
        branch < fls_eval,
        "right operand evaluated before the short-circuit branch"
    );
    assert!(asm.contains("\tand\t$t0, $t0, $t1\n"));
    assert!(asm.contains("L0:\n"));
}

#[test]
fn test_edge_short_circuit_or() {
    let asm = compile("bool b;\nint main() {\n    b = fls || tru;\n    return 0;\n}");

    assert!(asm.contains("\tbne\t$t0, 0, L0\n"));
    assert!(asm.contains("\tor\t$t0, $t0, $t1\n"));
}

#[test]
fn test_edge_string_pool_dedup() {
    // S5: two identical literals, one .asciiz
    let asm =
        compile("int main() {\n    print << \"hi\";\n    print << \"hi\";\n    return 0;\n}");

    assert_eq!(asm.matches(".asciiz \"hi\"").count(), 1);
    assert_eq!(asm.matches("\tli\t$v0, 4\n").count(), 2);
}

#[test]
fn test_edge_distinct_strings_get_distinct_labels() {
    let asm =
        compile("int main() {\n    print << \"a\";\n    print << \"b\";\n    return 0;\n}");

    assert!(asm.contains("L0:\t.asciiz \"a\"\n"));
    assert!(asm.contains("L1:\t.asciiz \"b\"\n"));
}

#[test]
fn test_edge_call_frame_discipline() {
    // S6: after the call, $sp is restored by 8 and $v0 pushed
    let asm = compile(
        "int f(int a, int b) {\n    return a + b;\n}\nint main() {\n    return f(1, 2);\n}",
    );

    let jal = asm.find("\tjal\t_f\n").expect("call missing");
    let drop_args = asm[jal..]
        .find("\taddu\t$sp, $sp, 8\n")
        .expect("argument drop missing")
        + jal;
    let push_v0 = asm[drop_args..]
        .find("\tsw\t$v0, 0($sp)\n")
        .expect("result push missing")
        + drop_args;
    assert!(jal < drop_args && drop_args < push_v0);

    // formals read back at 4(N - i)($fp): a at 8, b at 4
    assert!(asm.contains("\tlw\t$t0, 8($fp)\n"));
    assert!(asm.contains("\tlw\t$t0, 4($fp)\n"));
}

#[test]
fn test_edge_print_and_receive_syscalls() {
    let asm = compile(
        "int main() {\n    int a;\n    receive >> a;\n    print << a;\n    print << \"s\";\n    return 0;\n}",
    );

    assert!(asm.contains("\tli\t$v0, 5\n")); // read int
    assert!(asm.contains("\tli\t$v0, 1\n")); // print int
    assert!(asm.contains("\tli\t$v0, 4\n")); // print string
    // the received word is stored through the target address
    assert!(asm.contains("\tsw\t$v0, 0($t0)\n"));
}

#[test]
fn test_edge_while_loop_shape() {
    let asm = compile(
        "int main() {\n    int i;\n    i = 3;\n    while (i > 0) {\n        --i;\n    }\n    return 0;\n}",
    );

    let top = asm.find("L0:\n").expect("top label missing");
    let exit_branch = asm.find("\tbeq\t$t0, 0, L1\n").expect("exit branch missing");
    let back_jump = asm.find("\tb\tL0\n").expect("back jump missing");
    let end = asm.find("L1:\n").expect("end label missing");
    assert!(top < exit_branch && exit_branch < back_jump && back_jump < end);
    assert!(asm.contains("\tsgt\t$t0, $t0, $t1\n"));
}

#[test]
fn test_edge_if_else_shape() {
    let asm = compile(
        "int main() {\n    if (tru) {\n        print << 1;\n    } else {\n        print << 2;\n    }\n    return 0;\n}",
    );

    assert!(asm.contains("\tbeq\t$t0, 0, L0\n"));
    assert!(asm.contains("\tb\tL1\n"));
    assert!(asm.contains("L0:\n"));
    assert!(asm.contains("L1:\n"));
}

#[test]
fn test_edge_unary_lowering() {
    let asm = compile(
        "int main() {\n    int a;\n    bool b;\n    a = -3;\n    b = !tru;\n    return 0;\n}",
    );

    // unary minus is 0 - x
    assert!(asm.contains("\tsub\t$t0, $t0, $t1\n"));
    // logical not is negate then add one
    assert!(asm.contains("\tneg\t$t0, $t0\n"));
    assert!(asm.contains("\tadd\t$t0, $t0, $t1\n"));
}

#[test]
fn test_edge_chained_assignment_stores_twice() {
    let asm =
        compile("int main() {\n    int a;\n    int b;\n    a = b = 3;\n    return 0;\n}");
    assert_eq!(asm.matches("\tsw\t$t1, 0($t0)\n").count(), 2);
}

#[test]
fn test_edge_repeat_not_lowered() {
    let asm = compile(
        "int main() {\n    repeat (3) {\n        print << 1;\n    }\n    return 0;\n}",
    );

    assert!(asm.contains("# repeat statement not lowered"));
    // the body is omitted along with the loop
    assert!(!asm.contains("\tli\t$v0, 1\n"));
}

#[test]
fn test_edge_division_and_equality_mnemonics() {
    let asm = compile(
        "int main() {\n    int a;\n    bool b;\n    a = 6 / 2;\n    b = a == 3;\n    b = a != 3;\n    b = a <= 3;\n    b = a >= 3;\n    b = a < 3;\n    return 0;\n}",
    );

    for op in ["div", "seq", "sne", "sle", "sge", "slt"] {
        assert!(
            asm.contains(&format!("\t{}\t$t0, $t0, $t1\n", op)),
            "missing {}",
            op
        );
    }
}
