//! Pan/zoom endpoint math for the slide transition, kept free of any
//! windowing or GPU types so the animation contract stays unit-testable.

use rand::Rng;

use crate::config::AspectRatioTarget;

/// On-stage rectangle in pixels; `x`/`y` is the top-left corner and may go
/// negative when the slide overflows the stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Placement {
    pub fn lerp(start: &Placement, end: &Placement, t: f32) -> Placement {
        let t = t.clamp(0.0, 1.0);
        Placement {
            x: start.x + (end.x - start.x) * t,
            y: start.y + (end.y - start.y) * t,
            w: start.w + (end.w - start.w) * t,
            h: start.h + (end.h - start.h) * t,
        }
    }
}

/// Animation endpoints for one slide: size/position at fade-in and at the
/// end of the display interval.
#[derive(Debug, Clone, Copy)]
pub struct PanZoomPlan {
    pub start: Placement,
    pub end: Placement,
}

#[derive(Debug, Clone, Copy)]
pub struct MotionOptions {
    pub zoom: f32,
    pub pan: f32,
    pub ar_target: AspectRatioTarget,
}

/// Scale factor that makes an image fill (`max`) or fit (`min`) the stage.
pub fn ratio_to_screen(
    stage_w: f32,
    stage_h: f32,
    image_w: f32,
    image_h: f32,
    target: AspectRatioTarget,
) -> f32 {
    let wr = stage_w / image_w;
    let hr = stage_h / image_h;
    match target {
        AspectRatioTarget::Max => wr.max(hr),
        AspectRatioTarget::Min => wr.min(hr),
    }
}

fn centered(stage_w: f32, stage_h: f32, w: f32, h: f32) -> Placement {
    Placement {
        x: -(w - stage_w) / 2.0,
        y: -(h - stage_h) / 2.0,
        w,
        h,
    }
}

/// Compute the two animation endpoints for a new slide.
///
/// The small endpoint is the screen-scaled image, centered; the big endpoint
/// applies a random zoom factor and a random pan offset. `enlarge` picks the
/// travel direction and must strictly alternate between consecutive slides.
/// A safety margin is folded into both endpoints when zoom is enabled so
/// panning never reveals an empty stage edge.
pub fn plan_pan_zoom<R: Rng>(
    rng: &mut R,
    stage_w: f32,
    stage_h: f32,
    image_w: f32,
    image_h: f32,
    opts: &MotionOptions,
    enlarge: bool,
) -> PanZoomPlan {
    let pan_px = stage_w.max(stage_h) * opts.pan;
    let rand_pan = |rng: &mut R| -> f32 {
        let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        sign * (pan_px + pan_px * rng.random::<f32>())
    };
    let zoom_factor = (1.0 + opts.zoom) * (1.0 + opts.zoom * rng.random::<f32>());

    let scale = ratio_to_screen(stage_w, stage_h, image_w, image_h, opts.ar_target);
    let (base_w, base_h) = (image_w * scale, image_h * scale);

    let safety_zoom = if opts.zoom > 0.0 {
        1.0 + opts.pan / 2.0
    } else {
        1.0
    };

    let (small_w, small_h) = (base_w * safety_zoom, base_h * safety_zoom);
    let (big_w, big_h) = (small_w * zoom_factor, small_h * zoom_factor);

    let small = centered(stage_w, stage_h, small_w, small_h);
    let mut big = centered(stage_w, stage_h, big_w, big_h);
    big.x += rand_pan(&mut *rng);
    big.y += rand_pan(&mut *rng);

    if enlarge {
        PanZoomPlan {
            start: small,
            end: big,
        }
    } else {
        PanZoomPlan {
            start: big,
            end: small,
        }
    }
}

/// Whether the next slide zooms in or out. Strict alternation from a fixed
/// starting point gives visual variety without ever repeating a direction.
#[derive(Debug, Default)]
pub struct ZoomDirection {
    enlarge: bool,
}

impl ZoomDirection {
    /// Direction for the next slide; the first call always enlarges.
    pub fn next(&mut self) -> bool {
        self.enlarge = !self.enlarge;
        self.enlarge
    }
}

/// Fade-in easing for the incoming slide.
pub fn ease_out_sine(t: f32) -> f32 {
    (t.clamp(0.0, 1.0) * std::f32::consts::FRAC_PI_2).sin()
}

/// Fade-out easing for the outgoing slide (applied to the fade progress;
/// the caller inverts it into an opacity).
pub fn ease_in_sine(t: f32) -> f32 {
    1.0 - (t.clamp(0.0, 1.0) * std::f32::consts::FRAC_PI_2).cos()
}
