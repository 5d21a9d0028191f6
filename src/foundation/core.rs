use crate::foundation::error::{TgsError, TgsResult};

/// Authoring canvas dimensions as declared by the document (`w`, `h`).
///
/// Lottie stores these as plain JSON numbers, so they are kept as `f64` and only rounded when
/// presented to a user.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct CanvasSize {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl CanvasSize {
    /// Create a canvas size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The larger of the two dimensions.
    pub fn longest_side(self) -> f64 {
        self.width.max(self.height)
    }

    /// Uniform scale factor that fits the longest side into `target` pixels.
    ///
    /// Degenerate canvases produce a non-finite factor; callers decide how to reject it.
    pub fn fit_scale(self, target: f64) -> f64 {
        target / self.longest_side()
    }

    /// Center point of the canvas.
    pub fn center(self) -> [f64; 2] {
        [self.width / 2.0, self.height / 2.0]
    }
}

/// Active timeline of a document: frames `[in_point, out_point]` played at `frame_rate`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Timeline {
    /// First frame of the playable range (`ip`).
    pub in_point: f64,
    /// Frame the playable range ends at (`op`).
    pub out_point: f64,
    /// Frames per second (`fr`).
    pub frame_rate: f64,
}

impl Timeline {
    /// Create a validated timeline.
    ///
    /// Requires a finite, positive frame rate and `out_point > in_point`, so that the derived
    /// duration is always finite and positive.
    pub fn new(in_point: f64, out_point: f64, frame_rate: f64) -> TgsResult<Self> {
        if !frame_rate.is_finite() || frame_rate <= 0.0 {
            return Err(TgsError::invalid_timing(format!(
                "frame rate must be a positive number, got {frame_rate}"
            )));
        }
        if !in_point.is_finite() || !out_point.is_finite() {
            return Err(TgsError::invalid_timing("in/out points must be finite"));
        }
        if out_point <= in_point {
            return Err(TgsError::invalid_timing(format!(
                "out point ({out_point}) must be greater than in point ({in_point})"
            )));
        }
        let timeline = Self {
            in_point,
            out_point,
            frame_rate,
        };
        if !timeline.duration_secs().is_finite() {
            return Err(TgsError::invalid_timing("duration is not a finite number"));
        }
        Ok(timeline)
    }

    /// Number of frames between in and out point.
    pub fn len_frames(self) -> f64 {
        self.out_point - self.in_point
    }

    /// Playable duration in seconds.
    pub fn duration_secs(self) -> f64 {
        self.len_frames() / self.frame_rate
    }

    /// Clamp the timeline to at most `max_secs` seconds.
    ///
    /// Frames past the limit are dropped; the frame rate is left alone, so playback speed does not
    /// change. Timelines already within the limit are returned as-is.
    pub fn capped(self, max_secs: f64) -> Self {
        let max_frames = max_secs * self.frame_rate;
        if self.len_frames() > max_frames {
            Self {
                out_point: self.in_point + max_frames,
                ..self
            }
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_scale_uses_longest_side() {
        let c = CanvasSize::new(100.0, 200.0);
        assert_eq!(c.longest_side(), 200.0);
        assert_eq!(c.fit_scale(512.0), 512.0 / 200.0);
        assert_eq!(c.center(), [50.0, 100.0]);
    }

    #[test]
    fn fit_scale_of_empty_canvas_is_not_finite() {
        assert!(!CanvasSize::new(0.0, 0.0).fit_scale(512.0).is_finite());
    }

    #[test]
    fn timeline_rejects_zero_rate() {
        let err = Timeline::new(0.0, 60.0, 0.0).unwrap_err();
        assert!(matches!(err, TgsError::InvalidTiming(_)));
    }

    #[test]
    fn timeline_rejects_empty_range() {
        assert!(Timeline::new(10.0, 10.0, 30.0).is_err());
        assert!(Timeline::new(10.0, 5.0, 30.0).is_err());
    }

    #[test]
    fn capped_clamps_long_timelines() {
        let t = Timeline::new(0.0, 300.0, 60.0).unwrap();
        assert_eq!(t.duration_secs(), 5.0);
        let c = t.capped(3.0);
        assert_eq!(c.out_point, 180.0);
        assert_eq!(c.in_point, 0.0);
        assert_eq!(c.frame_rate, 60.0);
    }

    #[test]
    fn capped_keeps_offset_in_point() {
        let t = Timeline::new(30.0, 400.0, 30.0).unwrap();
        assert_eq!(t.capped(3.0).out_point, 120.0);
    }

    #[test]
    fn capped_leaves_short_timelines_alone() {
        let t = Timeline::new(0.0, 120.0, 60.0).unwrap();
        assert_eq!(t.capped(3.0), t);
        let exact = Timeline::new(0.0, 180.0, 60.0).unwrap();
        assert_eq!(exact.capped(3.0), exact);
    }
}
