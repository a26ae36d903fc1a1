use tui_sketchbook::render::{AsciiRenderer, BrailleRenderer, Frame, HalfBlockRenderer, Renderer};

/// Frame over a gradient so every backend has something non-trivial to map.
fn gradient_pixels(w: usize, h: usize) -> Vec<u8> {
    let mut px = vec![0u8; w * h * 4];
    for y in 0..h {
        for x in 0..w {
            let i = (y * w + x) * 4;
            px[i] = (x * 255 / w.max(1)) as u8;
            px[i + 1] = (y * 255 / h.max(1)) as u8;
            px[i + 2] = 128;
            px[i + 3] = 255;
        }
    }
    px
}

fn frame<'a>(
    cols: u16,
    visual_rows: u16,
    w: usize,
    h: usize,
    pixels: &'a [u8],
    hud: &'a str,
    sync: bool,
) -> Frame<'a> {
    Frame {
        term_cols: cols,
        term_rows: visual_rows + 1,
        visual_rows,
        pixel_width: w,
        pixel_height: h,
        pixels_rgba: pixels,
        hud,
        hud_rows: if hud.is_empty() { 0 } else { 1 },
        overlay: None,
        sync_updates: sync,
    }
}

fn render_to_string(r: &mut dyn Renderer, f: &Frame<'_>) -> String {
    let mut out = Vec::new();
    r.render(f, &mut out).expect("render");
    String::from_utf8(out).expect("renderer output must be utf8")
}

#[test]
fn halfblock_paints_every_cell_once() {
    let (cols, rows) = (12u16, 5u16);
    let (w, h) = (12usize, 10usize);
    let px = gradient_pixels(w, h);
    let mut r = HalfBlockRenderer::new();
    let s = render_to_string(&mut r, &frame(cols, rows, w, h, &px, "hud line", false));

    assert!(s.starts_with("\x1b[H\x1b[0m"), "missing home/reset prologue");
    assert_eq!(
        s.matches('\u{2580}').count(),
        cols as usize * rows as usize,
        "one half-block per cell"
    );
    assert_eq!(s.matches("\r\n").count(), rows as usize);
    assert!(s.contains("hud line"));
    assert!(s.contains("\x1b[?7l") && s.contains("\x1b[?7h"), "autowrap guard");
    assert!(!s.contains("\x1b[?2026h"), "sync markers without sync_updates");
}

#[test]
fn sync_updates_wrap_the_frame() {
    let (w, h) = (8usize, 8usize);
    let px = gradient_pixels(w, h);
    let mut r = HalfBlockRenderer::new();
    let s = render_to_string(&mut r, &frame(8, 4, w, h, &px, "", true));
    assert!(s.starts_with("\x1b[?2026h"));
    assert!(s.ends_with("\x1b[?2026l"));
}

#[test]
fn braille_emits_dot_cells() {
    let (cols, rows) = (10u16, 4u16);
    let (w, h) = (20usize, 16usize);
    let px = gradient_pixels(w, h);
    let mut r = BrailleRenderer::new();
    let s = render_to_string(&mut r, &frame(cols, rows, w, h, &px, "", false));

    let braille_cells = s
        .chars()
        .filter(|&c| ('\u{2800}'..='\u{28FF}').contains(&c) || c == ' ')
        .count();
    assert_eq!(braille_cells, cols as usize * rows as usize);
    assert!(
        s.chars().any(|c| ('\u{2801}'..='\u{28FF}').contains(&c)),
        "gradient produced no dots at all"
    );
}

#[test]
fn ascii_sticks_to_its_ramp() {
    let (cols, rows) = (16u16, 8u16);
    let (w, h) = (16usize, 8usize);
    let px = gradient_pixels(w, h);
    let mut r = AsciiRenderer::new();
    let s = render_to_string(&mut r, &frame(cols, rows, w, h, &px, "", false));

    const RAMP: &str = " .,:;irsXA253hMHGS#9B&@";
    let mut cells = 0usize;
    let mut in_escape = false;
    for c in s.chars() {
        if in_escape {
            if c.is_ascii_alphabetic() {
                in_escape = false;
            }
            continue;
        }
        match c {
            '\x1b' => in_escape = true,
            '\r' | '\n' => {}
            c => {
                assert!(RAMP.contains(c), "unexpected glyph {c:?}");
                cells += 1;
            }
        }
    }
    assert_eq!(cells, cols as usize * rows as usize);
}

#[test]
fn mismatched_geometry_is_skipped_quietly() {
    let (w, h) = (10usize, 10usize);
    let px = gradient_pixels(w, h);
    // halfblock expects h == visual_rows * 2; give it a 1:1 frame.
    let mut r = HalfBlockRenderer::new();
    let s = render_to_string(&mut r, &frame(10, 10, w, h, &px, "", false));
    assert!(s.is_empty(), "mismatched frame should render nothing");
}

#[test]
fn short_pixel_buffer_reports_instead_of_panicking() {
    let (w, h) = (16usize, 8usize);
    let px = vec![0u8; 16]; // far too small
    let mut r = HalfBlockRenderer::new();
    let s = render_to_string(&mut r, &frame(16, 4, w, h, &px, "", false));
    assert!(s.contains("pixel buffer too small"));
}
