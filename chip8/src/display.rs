use emu8::constants::DISPLAY_WIDTH;
use emu8::FrameBuffer;

/// Formats a Chip-8 FrameBuffer as text for a terminal.
///
/// Lit pixels become `*`, unlit pixels a space, and the whole frame is
/// bordered with `#` so trailing blank columns stay visible.
///
/// # Arguments
/// * `frame` a Chip-8 FrameBuffer
pub fn frame_to_text(frame: &FrameBuffer) -> String {
    let border = "#".repeat(DISPLAY_WIDTH + 2);
    let rows = frame.iter().map(|row| {
        let pixels: String = row.iter().map(|&p| if p == 1 { '*' } else { ' ' }).collect();
        format!("#{}#", pixels)
    });

    std::iter::once(border.clone())
        .chain(rows)
        .chain(std::iter::once(border))
        .map(|line| line + "\n")
        .collect()
}
