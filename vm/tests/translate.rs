//! End-to-end scenarios: VM source is translated, the emitted assembly is
//! assembled, and the binary runs on the emulator. Checking machine state
//! instead of emitted text keeps the call frame protocol honest about its
//! effect.

use hackemu::machine::Machine;
use hackvm::codegen::CodeWriter;

fn translate(writer: &mut CodeWriter, prefix: &str, src: &str) -> Vec<String> {
    writer.begin_file(prefix);
    let mut out = vec![];
    for (idx, raw) in src.lines().enumerate() {
        let line = hackvm::parser::Line::parse("test.vm", idx, raw).unwrap();
        if let Some(command) = &line.command {
            out.extend(writer.translate(command).unwrap());
        }
    }
    out
}

fn assemble(asm: &[String]) -> Vec<u16> {
    let lines: Vec<hackasm::parser::Line> = asm
        .iter()
        .enumerate()
        .map(|(idx, raw)| hackasm::parser::Line::parse("test.asm", idx, raw).unwrap())
        .collect();
    hackasm::resolve::assemble(&lines)
        .unwrap()
        .iter()
        .map(|word| word.0)
        .collect()
}

/// Assemble and run with the stack pointer preset to 256, as the VM
/// convention expects when no bootstrap is emitted.
fn execute(asm: &[String], cycles: u64) -> Machine {
    let mut machine = Machine::new();
    machine.load(&assemble(asm));
    machine.ram[0] = 256;
    machine.run(cycles);
    machine
}

fn run_vm(src: &str, cycles: u64) -> Machine {
    let mut writer = CodeWriter::new();
    let asm = translate(&mut writer, "Test", src);
    execute(&asm, cycles)
}

const SP: usize = 0;
const TRUE: u16 = 0xFFFF;

#[test]
fn add_leaves_one_cell() {
    let m = run_vm("push constant 7\npush constant 8\nadd", 100);
    assert_eq!(m.ram[SP], 257);
    assert_eq!(m.ram[256], 15);
}

#[test]
fn comparison_true_is_all_ones() {
    // 7 + 8 == 15
    let m = run_vm(
        "push constant 7\npush constant 8\nadd\npush constant 15\neq",
        200,
    );
    assert_eq!(m.ram[SP], 257);
    assert_eq!(m.ram[256], TRUE);
}

#[test]
fn comparison_false_is_all_zeros() {
    let m = run_vm("push constant 7\npush constant 8\neq", 200);
    assert_eq!(m.ram[SP], 257);
    assert_eq!(m.ram[256], 0);
}

#[test]
fn ordered_comparisons() {
    let m = run_vm(
        "push constant 7\npush constant 8\nadd\npush constant 16\nlt",
        200,
    );
    assert_eq!(m.ram[256], TRUE);

    let m = run_vm("push constant 2\npush constant 1\ngt", 200);
    assert_eq!(m.ram[256], TRUE);

    let m = run_vm("push constant 1\npush constant 2\ngt", 200);
    assert_eq!(m.ram[256], 0);
}

#[test]
fn unary_and_bitwise_ops() {
    let m = run_vm("push constant 5\nneg", 100);
    assert_eq!(m.ram[256] as i16, -5);

    let m = run_vm("push constant 5\nnot", 100);
    assert_eq!(m.ram[256], !5u16);

    let m = run_vm("push constant 12\npush constant 10\nand", 100);
    assert_eq!(m.ram[256], 8);

    let m = run_vm("push constant 12\npush constant 10\nor", 100);
    assert_eq!(m.ram[256], 14);

    let m = run_vm("push constant 44\npush constant 2\nsub", 100);
    assert_eq!(m.ram[256], 42);
}

#[test]
fn if_goto_takes_any_nonzero_value() {
    // 3 is true even though it is not all-ones.
    let m = run_vm(
        "push constant 3\nif-goto SKIP\npush constant 100\nlabel SKIP",
        100,
    );
    assert_eq!(m.ram[SP], 256);

    // 0 falls through.
    let m = run_vm(
        "push constant 0\nif-goto SKIP\npush constant 100\nlabel SKIP",
        100,
    );
    assert_eq!(m.ram[SP], 257);
    assert_eq!(m.ram[256], 100);
}

#[test]
fn temp_and_pointer_segments() {
    let m = run_vm(
        "push constant 42\n\
         pop temp 7\n\
         push constant 9\n\
         pop pointer 1\n\
         push temp 7\n\
         push pointer 1\n\
         add",
        300,
    );
    // temp 7 is R12; pointer 1 is THAT.
    assert_eq!(m.ram[12], 42);
    assert_eq!(m.ram[4], 9);
    assert_eq!(m.ram[SP], 257);
    assert_eq!(m.ram[256], 51);
}

#[test]
fn base_pointer_segments() {
    let mut writer = CodeWriter::new();
    let asm = translate(
        &mut writer,
        "Test",
        "push constant 10\n\
         pop local 2\n\
         push constant 20\n\
         pop argument 1\n\
         push local 2\n\
         push argument 1\n\
         add",
    );
    let mut machine = Machine::new();
    machine.load(&assemble(&asm));
    machine.ram[0] = 256;
    machine.ram[1] = 300;
    machine.ram[2] = 400;
    machine.run(400);
    assert_eq!(machine.ram[302], 10);
    assert_eq!(machine.ram[401], 20);
    assert_eq!(machine.ram[256], 30);
}

#[test]
fn call_and_return_restore_the_caller_frame() {
    let mut writer = CodeWriter::new();
    let asm = translate(
        &mut writer,
        "Test",
        "push constant 111\n\
         push constant 222\n\
         call Twice.go 2\n\
         label HALT\n\
         goto HALT\n\
         function Twice.go 0\n\
         push constant 7\n\
         return",
    );
    let mut machine = Machine::new();
    machine.load(&assemble(&asm));
    machine.ram[0] = 256;
    machine.ram[1] = 1111;
    machine.ram[2] = 2222;
    machine.ram[3] = 3333;
    machine.ram[4] = 4444;
    machine.run(500);

    // Two arguments popped, one return value left: SP = 258 - 2 + 1.
    assert_eq!(machine.ram[SP], 257);
    assert_eq!(machine.ram[256], 7);
    // All four saved pointers are back.
    assert_eq!(machine.ram[1], 1111);
    assert_eq!(machine.ram[2], 2222);
    assert_eq!(machine.ram[3], 3333);
    assert_eq!(machine.ram[4], 4444);
}

#[test]
fn zero_argument_call_with_locals() {
    // With no arguments the return value lands exactly where the return
    // address was saved, which is why return reads it into R14 first.
    let m = run_vm(
        "call Calc.sum 0\n\
         label HALT\n\
         goto HALT\n\
         function Calc.sum 2\n\
         push constant 6\n\
         pop local 0\n\
         push constant 7\n\
         pop local 1\n\
         push local 0\n\
         push local 1\n\
         add\n\
         return",
        1000,
    );
    assert_eq!(m.ram[SP], 257);
    assert_eq!(m.ram[256], 13);
}

#[test]
fn nested_calls() {
    let m = run_vm(
        "push constant 4\n\
         call Outer.f 1\n\
         label HALT\n\
         goto HALT\n\
         function Outer.f 0\n\
         push argument 0\n\
         push constant 1\n\
         add\n\
         call Inner.g 1\n\
         return\n\
         function Inner.g 0\n\
         push argument 0\n\
         push argument 0\n\
         add\n\
         return",
        2000,
    );
    // Inner.g doubles (4+1); Outer.f returns its value.
    assert_eq!(m.ram[SP], 257);
    assert_eq!(m.ram[256], 10);
}

#[test]
fn statics_are_namespaced_per_file() {
    let mut writer = CodeWriter::new();
    let mut asm = translate(
        &mut writer,
        "Alpha",
        "push constant 11\npop static 3",
    );
    asm.extend(translate(
        &mut writer,
        "Beta",
        "push constant 22\npop static 3\npush static 3",
    ));
    let machine = execute(&asm, 300);
    // Two distinct cells, allocated in first-reference order from 16.
    assert_eq!(machine.ram[16], 11);
    assert_eq!(machine.ram[17], 22);
    assert_eq!(machine.ram[256], 22);
}

#[test]
fn bootstrap_establishes_the_first_frame() {
    let mut writer = CodeWriter::new();
    let mut asm = writer.bootstrap();
    asm.extend(translate(
        &mut writer,
        "Sys",
        "function Sys.init 0\n\
         push constant 5\n\
         label HALT\n\
         goto HALT",
    ));
    let mut machine = Machine::new();
    machine.load(&assemble(&asm));
    machine.run(300);

    // call Sys.init 0 saved five cells above the stack base.
    assert_eq!(machine.ram[1], 261); // LCL
    assert_eq!(machine.ram[2], 256); // ARG
    assert_eq!(machine.ram[SP], 262);
    assert_eq!(machine.ram[261], 5);
}

#[test]
fn function_scoped_labels_do_not_collide() {
    // Both functions loop over a label called AGAIN; the mangled names
    // keep them apart in the shared assembly namespace.
    let m = run_vm(
        "call A.count 0\n\
         label HALT\n\
         goto HALT\n\
         function A.count 1\n\
         push constant 2\n\
         pop local 0\n\
         label AGAIN\n\
         push local 0\n\
         push constant 1\n\
         sub\n\
         pop local 0\n\
         push local 0\n\
         if-goto AGAIN\n\
         call B.nothing 0\n\
         return\n\
         function B.nothing 0\n\
         label AGAIN\n\
         push constant 0\n\
         if-goto AGAIN\n\
         push constant 99\n\
         return",
        5000,
    );
    // A.count returns B.nothing's 99.
    assert_eq!(m.ram[SP], 257);
    assert_eq!(m.ram[256], 99);
}
