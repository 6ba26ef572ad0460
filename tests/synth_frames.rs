use std::sync::Mutex;

use editmotion::{
    Canvas, EditMotionError, EditMotionResult, Ease, FrameKind, FrameRGBA, FrameTiming, Rasterizer,
    align_str, synthesize, synthesize_with_stats,
};

const WIDTH: u32 = 16;

/// Writes the text bytes into the red channel of a 16x1 strip so frames can be read back.
#[derive(Default)]
struct TapeRasterizer {
    texts: Mutex<Vec<String>>,
    overlays: Mutex<Vec<(String, usize, char)>>,
}

impl TapeRasterizer {
    fn text_calls(&self) -> usize {
        self.texts.lock().unwrap().len()
    }

    fn overlay_calls(&self) -> Vec<(String, usize, char)> {
        self.overlays.lock().unwrap().clone()
    }
}

impl Rasterizer for TapeRasterizer {
    fn canvas(&self) -> Canvas {
        Canvas::new(WIDTH, 1).unwrap()
    }

    fn render_text(&self, text: &str) -> EditMotionResult<FrameRGBA> {
        self.texts.lock().unwrap().push(text.to_string());
        let mut frame = FrameRGBA::solid(self.canvas(), [0, 0, 0, 255]);
        for (i, b) in text.bytes().take(WIDTH as usize).enumerate() {
            frame.data[i * 4] = b;
        }
        Ok(frame)
    }

    fn render_glyph_overlay(
        &self,
        layout_text: &str,
        index: usize,
        glyph: char,
        opacity: f32,
    ) -> EditMotionResult<FrameRGBA> {
        self.overlays
            .lock()
            .unwrap()
            .push((layout_text.to_string(), index, glyph));
        let mut layer = FrameRGBA::transparent(self.canvas());
        let a = (opacity * 255.0).round() as u8;
        let px = index.min(WIDTH as usize - 1) * 4;
        layer.data[px..px + 4].copy_from_slice(&[a, a, a, a]);
        Ok(layer)
    }
}

fn read_tape(frame: &FrameRGBA) -> String {
    frame
        .data
        .chunks_exact(4)
        .map(|px| px[0])
        .take_while(|&b| b != 0)
        .map(char::from)
        .collect()
}

fn timing(hold: u32, transition: u32) -> FrameTiming {
    FrameTiming {
        hold_frames: hold,
        transition_frames: transition,
        ..FrameTiming::default()
    }
}

#[test]
fn cat_to_cats_ends_on_cats() {
    let r = TapeRasterizer::default();
    let a = align_str("CAT", "CATS");
    let frames = synthesize("CAT", "CATS", &a.ops, &timing(2, 3), &r).unwrap();

    assert_eq!(frames.len(), 2 * 2 + 3 + 1);
    assert_eq!(read_tape(&frames[0].image), "CAT");
    assert_eq!(read_tape(&frames.last().unwrap().image), "CATS");
    assert_eq!(frames.last().unwrap().kind, FrameKind::Hold);
    assert_eq!(frames[2 + 3].kind, FrameKind::Settled { op_index: 0 });
}

#[test]
fn frame_count_is_holds_plus_transitions() {
    let r = TapeRasterizer::default();
    let t = timing(1, 5);
    for (a, b) in [
        ("KITTEN", "SITTING"),
        ("ABC", "BCD"),
        ("", "AB"),
        ("AB", ""),
        ("SAME", "SAME"),
    ] {
        let al = align_str(a, b);
        let frames = synthesize(a, b, &al.ops, &t, &r).unwrap();
        assert_eq!(frames.len(), 2 + al.ops.len() * 6, "{a} -> {b}");
        assert_eq!(frames.len(), t.frame_count(al.ops.len()));
    }
}

#[test]
fn transition_frames_carry_progress() {
    let r = TapeRasterizer::default();
    let a = align_str("CAT", "COT");
    let frames = synthesize("CAT", "COT", &a.ops, &timing(0, 3), &r).unwrap();
    let progress: Vec<f32> = frames.iter().map(|f| f.kind.progress()).collect();
    assert_eq!(progress, vec![0.0, 0.5, 1.0, 1.0]);
    assert!(frames.iter().all(|f| f.kind.op_index() == Some(0)));
}

#[test]
fn replace_overlays_old_glyph_on_new_string() {
    let r = TapeRasterizer::default();
    let a = align_str("CAT", "COT");
    synthesize("CAT", "COT", &a.ops, &timing(0, 3), &r).unwrap();
    let calls = r.overlay_calls();
    // the last transition frame has opacity 0 and draws no overlay
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|c| *c == ("COT".to_string(), 1, 'A')));
}

#[test]
fn deletes_use_live_positions() {
    let r = TapeRasterizer::default();
    let a = align_str("AB", "");
    synthesize("AB", "", &a.ops, &timing(0, 2), &r).unwrap();
    let calls = r.overlay_calls();
    assert_eq!(
        calls,
        vec![("B".to_string(), 0, 'A'), (String::new(), 0, 'B')]
    );
}

#[test]
fn identical_frames_are_rendered_once() {
    let r = TapeRasterizer::default();
    let a = align_str("CAT", "CATS");
    let (frames, stats) =
        synthesize_with_stats("CAT", "CATS", &a.ops, &timing(2, 3), &r).unwrap();

    assert_eq!(stats.frames_total, frames.len() as u64);
    assert_eq!(stats.frames_rendered, 4);
    assert_eq!(stats.frames_elided, 4);
    assert_eq!(r.text_calls(), 4);
    assert_eq!(r.overlay_calls().len(), 2);
}

#[test]
fn parallel_rendering_matches_sequential() {
    let a = align_str("KITTEN", "SITTING");
    let seq_timing = FrameTiming {
        ease: Ease::InOutQuad,
        ..timing(1, 6)
    };
    let par_timing = FrameTiming {
        parallel: true,
        ..seq_timing
    };

    let seq = synthesize("KITTEN", "SITTING", &a.ops, &seq_timing, &TapeRasterizer::default())
        .unwrap();
    let par = synthesize("KITTEN", "SITTING", &a.ops, &par_timing, &TapeRasterizer::default())
        .unwrap();

    assert_eq!(seq.len(), par.len());
    for (s, p) in seq.iter().zip(&par) {
        assert_eq!(s.kind, p.kind);
        assert_eq!(s.image, p.image);
    }
}

#[test]
fn mismatched_target_is_an_invariant_error() {
    let r = TapeRasterizer::default();
    let a = align_str("CATS", "CAT");
    let err = synthesize("CATS", "CAR", &a.ops, &timing(1, 2), &r).unwrap_err();
    assert!(matches!(err, EditMotionError::Invariant(_)));
    assert_eq!(r.text_calls(), 0);
}

struct WrongSize;

impl Rasterizer for WrongSize {
    fn canvas(&self) -> Canvas {
        Canvas::new(4, 4).unwrap()
    }

    fn render_text(&self, _text: &str) -> EditMotionResult<FrameRGBA> {
        Ok(FrameRGBA::transparent(Canvas::new(2, 2).unwrap()))
    }

    fn render_glyph_overlay(
        &self,
        _layout_text: &str,
        _index: usize,
        _glyph: char,
        _opacity: f32,
    ) -> EditMotionResult<FrameRGBA> {
        Ok(FrameRGBA::transparent(self.canvas()))
    }
}

#[test]
fn wrong_sized_frames_are_render_errors() {
    let a = align_str("A", "B");
    let err = synthesize("A", "B", &a.ops, &timing(1, 2), &WrongSize).unwrap_err();
    assert!(matches!(err, EditMotionError::Render(_)));
}
