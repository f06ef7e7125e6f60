use core_render::{CellFlags, Frame, RenderEngine, Tone, text_width};
use proptest::prelude::*;

fn frame(lines: &[String], width: u16) -> Frame {
    let mut f = Frame::new(width, lines.len() as u16);
    for (y, text) in lines.iter().enumerate() {
        f.put_str(0, y as u16, text, CellFlags::empty(), Tone::Plain);
    }
    f
}

proptest! {
    #[test]
    fn repaint_touches_exactly_the_changed_lines(
        before in prop::collection::vec("[a-c界 ]{0,8}", 1..8),
        edits in prop::collection::vec(any::<bool>(), 8),
        width in 4u16..16,
    ) {
        let after: Vec<String> = before
            .iter()
            .zip(&edits)
            .map(|(line, edit)| if *edit { format!("{line}x") } else { line.clone() })
            .collect();
        let old = frame(&before, width);
        let new = frame(&after, width);
        let expected: Vec<u16> = (0..new.height).filter(|&y| old.line(y) != new.line(y)).collect();

        let mut engine = RenderEngine::new();
        let mut out = Vec::new();
        engine.render(old, &mut out).unwrap();
        engine.render(new, &mut out).unwrap();
        prop_assert_eq!(engine.last_repaint_lines(), expected.as_slice());
    }

    #[test]
    fn text_never_overflows_the_frame(text in "[a-z界e\u{301} ]{0,40}", width in 1u16..20) {
        let mut f = Frame::new(width, 1);
        let end = f.put_str(0, 0, &text, CellFlags::empty(), Tone::Plain);
        prop_assert!(end <= width);
        prop_assert!(text_width(&f.line_text(0)) <= width as usize);
    }
}
