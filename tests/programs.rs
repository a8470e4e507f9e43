use emu8::{Chip8, Config, Instruction, MachineFault, SpriteEdge};

/// Builds a machine with a fixed seed and `program` loaded at 0x200
fn boot(program: &[u16]) -> Chip8 {
    boot_with(Config::default(), program)
}

fn boot_with(config: Config, program: &[u16]) -> Chip8 {
    let rom: Vec<u8> = program.iter().flat_map(|word| word.to_be_bytes()).collect();
    let mut chip8 = Chip8::with_config(config.with_seed(0xC8));
    chip8.load_rom(&rom).unwrap();
    chip8
}

fn run(chip8: &mut Chip8, cycles: usize) {
    for _ in 0..cycles {
        chip8.cycle().unwrap();
    }
}

#[test]
fn test_load_immediate_then_advance() {
    let mut chip8 = boot(&[0x600A]);
    chip8.cycle().unwrap();
    assert_eq!(chip8.state().v[0x0], 0x0A);
    assert_eq!(chip8.pc(), 0x202);
}

#[test]
fn test_skips_advance_pc_by_four_when_taken() {
    // V1 = 5, V2 = 5, then each skip compares equal values
    let taken = [0x3105, 0x4106, 0x5120, 0x9130];
    for skip in taken {
        let mut chip8 = boot(&[0x6105, 0x6205, skip]);
        run(&mut chip8, 2);
        chip8.cycle().unwrap();
        assert_eq!(chip8.pc(), 0x208, "executing {:04X}", skip);
    }

    let not_taken = [0x3106, 0x4105, 0x5130, 0x9120];
    for skip in not_taken {
        let mut chip8 = boot(&[0x6105, 0x6205, skip]);
        run(&mut chip8, 2);
        chip8.cycle().unwrap();
        assert_eq!(chip8.pc(), 0x206, "executing {:04X}", skip);
    }
}

#[test]
fn test_call_and_return() {
    // 0x200: JP 0x2FE, 0x2FE: CALL 0x400, 0x400: RET
    let mut program = vec![0x0000; 0x101];
    program[0x000] = 0x12FE;
    program[0x07F] = 0x2400;
    program[0x100] = 0x00EE;
    let mut chip8 = boot(&program);

    run(&mut chip8, 2);
    assert_eq!(chip8.pc(), 0x400);
    assert_eq!(chip8.state().sp, 1);
    assert_eq!(chip8.state().stack[0], 0x300);

    chip8.cycle().unwrap();
    assert_eq!(chip8.pc(), 0x300);
    assert_eq!(chip8.state().sp, 0);
}

#[test]
fn test_runaway_recursion_overflows_stack() {
    // 0x200: CALL 0x200
    let mut chip8 = boot(&[0x2200]);
    run(&mut chip8, 16);
    assert_eq!(
        chip8.cycle(),
        Err(MachineFault::StackOverflow { pc: 0x202 })
    );
}

#[test]
fn test_draws_font_glyph() {
    // LD V0, 0; LD F, V0; DRW V0, V0, 5
    let mut chip8 = boot(&[0x6000, 0xF029, 0xD005]);
    run(&mut chip8, 2);
    assert_eq!(chip8.state().i, 0x050);
    chip8.cycle().unwrap();

    let glyph = ["####", "#  #", "#  #", "#  #", "####"];
    for (y, row) in glyph.iter().enumerate() {
        for (x, cell) in row.chars().enumerate() {
            assert_eq!(chip8.pixel(x, y), cell == '#', "pixel ({}, {})", x, y);
        }
        assert!(!chip8.pixel(4, y));
    }
    assert_eq!(chip8.state().v[0xF], 0);

    let frame = chip8.take_frame().unwrap();
    assert_eq!(frame[0][0], 0xFFFF_FFFF);
    assert_eq!(frame[1][1], 0x0000_0000);
}

#[test]
fn test_redrawing_sprite_erases_and_collides() {
    let mut chip8 = boot(&[0x6000, 0xF029, 0xD005, 0xD005]);
    run(&mut chip8, 4);
    assert!(chip8.frame_buffer().iter().flatten().all(|&pixel| pixel == 0));
    assert_eq!(chip8.state().v[0xF], 1);
}

#[test]
fn test_sprite_wrap_policy_is_configurable() {
    // LD V0, 62; LD I, glyph "0"; DRW V0, V1, 1
    let program = [0x603E, 0xA050, 0xD011];

    let mut clipped = boot_with(Config::default().with_sprite_edge(SpriteEdge::Clip), &program);
    run(&mut clipped, 3);
    assert!(clipped.pixel(62, 0) && clipped.pixel(63, 0));
    assert!(!clipped.pixel(0, 0) && !clipped.pixel(1, 0));

    let mut wrapped = boot_with(Config::default().with_sprite_edge(SpriteEdge::Wrap), &program);
    run(&mut wrapped, 3);
    assert!(wrapped.pixel(62, 0) && wrapped.pixel(63, 0));
    assert!(wrapped.pixel(0, 0) && wrapped.pixel(1, 0));
}

#[test]
fn test_wait_key_busy_waits_until_pressed() {
    // Seven loads to reach 0x20E, then LD V3, K
    let mut chip8 = boot(&[
        0x6001, 0x6101, 0x6201, 0x6301, 0x6401, 0x6501, 0x6601, 0xF30A, 0x1210,
    ]);
    run(&mut chip8, 7);
    assert_eq!(chip8.pc(), 0x20E);

    chip8.cycle().unwrap();
    assert_eq!(chip8.pc(), 0x20E);
    assert_eq!(chip8.state().v[0x3], 0x01);

    assert_eq!(chip8.step(), Ok(Instruction::WaitKey { x: 3 }));
    assert_eq!(chip8.pc(), 0x20E);

    chip8.key_press(0x5);
    chip8.cycle().unwrap();
    assert_eq!(chip8.state().v[0x3], 0x05);
    assert_eq!(chip8.pc(), 0x210);
}

#[test]
fn test_counting_loop_with_bcd() {
    // 0x200 LD V0, 0
    // 0x202 ADD V0, 7
    // 0x204 SE V0, 0xFC
    // 0x206 JP 0x202
    // 0x208 LD I, 0x300
    // 0x20A LD B, V0
    // 0x20C LD V2, [I]
    // 0x20E JP 0x20E
    let mut chip8 = boot(&[
        0x6000, 0x7007, 0x30FC, 0x1202, 0xA300, 0xF033, 0xF265, 0x120E,
    ]);
    // 36 iterations of the three-instruction loop, the last without its jump
    run(&mut chip8, 1 + 36 * 3 - 1 + 3);
    assert_eq!(chip8.state().v[0x0], 2);
    assert_eq!(chip8.state().v[0x1], 5);
    assert_eq!(chip8.state().v[0x2], 2);
    assert_eq!(chip8.state().memory[0x300..0x303], [2, 5, 2]);
    assert_eq!(chip8.pc(), 0x20E);
}

#[test]
fn test_unknown_opcodes_are_skipped() {
    let mut chip8 = boot(&[0xF0FF, 0x8AB9, 0x6042]);
    run(&mut chip8, 3);
    assert_eq!(chip8.state().v[0x0], 0x42);
    assert_eq!(chip8.pc(), 0x206);
}

#[test]
fn test_running_off_the_end_of_memory_faults() {
    // JP 0xFFE, where memory is empty: 0x0000 decodes as CLS
    let mut chip8 = boot(&[0x1FFE]);
    run(&mut chip8, 2);
    assert_eq!(chip8.pc(), 0x1000);
    assert_eq!(
        chip8.cycle(),
        Err(MachineFault::MemoryOutOfBounds { address: 0x1000 })
    );
}
