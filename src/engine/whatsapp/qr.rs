// WhatsApp — Terminal QR Rendering
// render_terminal_qr

use crate::atoms::error::{EngineError, EngineResult};
use qrcode::{Color, EcLevel, QrCode};

/// Quiet zone (in modules) drawn around the code so phone cameras lock on.
const QUIET_ZONE: usize = 2;

/// Render `payload` as a compact block-character QR code.
///
/// Packs two rows of modules into one line using `▀`, `▄`, `█` and space,
/// so the code is roughly square in a terminal.
pub fn render_terminal_qr(payload: &str) -> EngineResult<String> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::L)
        .map_err(|e| EngineError::Other(format!("QR generation failed: {e}")))?;

    let width = code.width();
    let colors: Vec<Color> = code.into_colors();
    let size = width + 2 * QUIET_ZONE;
    let is_dark = |row: usize, col: usize| -> bool {
        if row < QUIET_ZONE || col < QUIET_ZONE {
            return false;
        }
        let (r, c) = (row - QUIET_ZONE, col - QUIET_ZONE);
        r < width && c < width && colors[r * width + c] == Color::Dark
    };

    let mut out = String::with_capacity(size * (size / 2 + 1) * 3);
    let mut row = 0;
    while row < size {
        for col in 0..size {
            out.push(match (is_dark(row, col), is_dark(row + 1, col)) {
                (true, true) => '█',
                (true, false) => '▀',
                (false, true) => '▄',
                (false, false) => ' ',
            });
        }
        out.push('\n');
        row += 2;
    }
    Ok(out)
}
