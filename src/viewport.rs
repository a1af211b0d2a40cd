//! Pan/zoom controller for the index raster.
//!
//! Screen placement mirrors a `translate(pan) scale(scale)` transform with its
//! origin at the raster centre, the raster being laid out centred in its
//! container:
//!
//! ```text
//! screen = container_centre + pan + scale * (p - natural / 2)
//! ```
//!
//! `pan` is in screen pixels, `p` in raster pixels. Every operation is a
//! total state transition: out-of-range inputs are clamped and missing sizes
//! turn the call into a no-op.

use crate::catalog::{Catalog, MapSheet};
use crate::constants::*;
use crate::geometry::Region;
use egui::{Pos2, Rect, Vec2};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportPhase {
    /// Raster natural size not known yet
    Uninitialized,
    FittedToContainer,
    UserTransformed,
    /// Moved programmatically to a selected sheet
    Recentered,
}

#[derive(Debug, Clone)]
pub struct Viewport {
    pan: Vec2,
    scale: f32,
    natural: Option<Vec2>,
    container: Option<Vec2>,
    phase: ViewportPhase,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            scale: INITIAL_SCALE,
            natural: None,
            container: None,
            phase: ViewportPhase::Uninitialized,
        }
    }
}

pub fn clamp_scale(scale: f32) -> f32 {
    if scale.is_nan() {
        MIN_SCALE
    } else {
        scale.clamp(MIN_SCALE, MAX_SCALE)
    }
}

fn usable(size: Option<Vec2>) -> Option<Vec2> {
    size.filter(|s| s.x.is_finite() && s.y.is_finite() && s.x > 0.0 && s.y > 0.0)
}

impl Viewport {
    #[cfg(test)]
    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    #[cfg(test)]
    pub fn phase(&self) -> ViewportPhase {
        self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.natural.is_some()
    }

    /// Scale that shows the whole raster inside the container, with a small
    /// margin, and a centred pan. Returns false if either size is unknown.
    pub fn fit_to_container(&mut self, natural: Option<Vec2>, container: Option<Vec2>) -> bool {
        let (Some(natural), Some(container)) = (usable(natural), usable(container)) else {
            return false;
        };
        let scale_w = container.x / natural.x;
        let scale_h = container.y / natural.y;
        self.scale = clamp_scale(scale_w.min(scale_h) * FIT_MARGIN);
        self.pan = Vec2::ZERO;
        self.phase = ViewportPhase::FittedToContainer;
        debug!(scale = self.scale, "Viewport fitted to container");
        true
    }

    /// Raster metadata arrived; store it and show the whole image.
    pub fn on_raster_loaded(&mut self, natural: Vec2, container: Option<Vec2>) {
        self.natural = usable(Some(natural));
        if let Some(c) = container {
            self.container = Some(c);
        }
        self.fit_to_container(self.natural, self.container);
    }

    /// Record the container size. Re-fit only while the user hasn't moved
    /// the view away from the fitted state, or when the raster arrived
    /// before any container was measured.
    pub fn measure_container(&mut self, size: Vec2) {
        let changed = self.container != Some(size);
        self.container = Some(size);
        let refit = match self.phase {
            ViewportPhase::FittedToContainer => changed,
            ViewportPhase::Uninitialized => self.natural.is_some(),
            _ => false,
        };
        if refit {
            self.fit_to_container(self.natural, self.container);
        }
    }

    /// Explicit "fit" request from the toolbar
    pub fn reset_to_fit(&mut self) -> bool {
        self.fit_to_container(self.natural, self.container)
    }

    pub fn apply_pan(&mut self, delta: Vec2) {
        if !delta.x.is_finite() || !delta.y.is_finite() || delta == Vec2::ZERO {
            return;
        }
        self.pan += delta;
        self.mark_user_transformed();
    }

    /// Wheel zoom with browser sign convention: positive `delta_y` scrolls
    /// down and zooms out.
    pub fn apply_zoom(&mut self, wheel_delta_y: f32) {
        if !wheel_delta_y.is_finite() || wheel_delta_y == 0.0 {
            return;
        }
        self.scale = clamp_scale(self.scale - wheel_delta_y * WHEEL_ZOOM_RATE);
        self.mark_user_transformed();
    }

    /// Multiplicative zoom from a pinch gesture
    pub fn apply_pinch(&mut self, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 || factor == 1.0 {
            return;
        }
        self.scale = clamp_scale(self.scale * factor);
        self.mark_user_transformed();
    }

    pub fn zoom_step(&mut self, step: f32) {
        self.scale = clamp_scale(self.scale + step);
        self.mark_user_transformed();
    }

    /// Move the view to a sheet region and zoom in to at least
    /// `SELECT_MIN_SCALE`; never zooms out. No-op until the raster is loaded.
    pub fn recenter_on(&mut self, region: &Region) -> bool {
        let (Some(natural), Some(c)) = (self.natural, region.centroid()) else {
            return false;
        };
        self.pan = Vec2::new(natural.x / 2.0 - c.x, natural.y / 2.0 - c.y);
        self.scale = clamp_scale(self.scale.max(SELECT_MIN_SCALE));
        self.phase = ViewportPhase::Recentered;
        debug!(cx = c.x, cy = c.y, scale = self.scale, "Viewport recentered");
        true
    }

    fn mark_user_transformed(&mut self) {
        if self.phase != ViewportPhase::Uninitialized {
            self.phase = ViewportPhase::UserTransformed;
        }
    }

    pub fn raster_to_screen(&self, p: Pos2, container: Rect) -> Option<Pos2> {
        let natural = self.natural?;
        Some(container.center() + self.pan + (p.to_vec2() - natural / 2.0) * self.scale)
    }

    pub fn screen_to_raster(&self, p: Pos2, container: Rect) -> Option<Pos2> {
        let natural = self.natural?;
        let rel = p - container.center() - self.pan;
        Some((rel / self.scale + natural / 2.0).to_pos2())
    }

    /// On-screen rectangle covered by the raster
    pub fn raster_rect(&self, container: Rect) -> Option<Rect> {
        let natural = self.natural?;
        let center = container.center() + self.pan;
        Some(Rect::from_center_size(center, natural * self.scale))
    }

    /// Sheet under a screen position, if any
    pub fn hit_test<'a>(&self, catalog: &'a Catalog, screen: Pos2, container: Rect) -> Option<&'a MapSheet> {
        let p = self.screen_to_raster(screen, container)?;
        catalog.sheet_at(p)
    }
}

/// Drag tracking between pointer-down and pointer-up. Deltas are taken from
/// the previous move, not the gesture start, so pan accumulates per event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging {
        last: Pos2,
    },
}

impl Gesture {
    pub fn begin(&mut self, pos: Pos2) {
        *self = Gesture::Dragging { last: pos };
    }

    /// Delta since the last recorded position; None when not dragging
    pub fn drag_to(&mut self, pos: Pos2) -> Option<Vec2> {
        match self {
            Gesture::Idle => None,
            Gesture::Dragging { last } => {
                let delta = pos - *last;
                *last = pos;
                Some(delta)
            }
        }
    }

    pub fn end(&mut self) {
        *self = Gesture::Idle;
    }

    /// One frame of pointer input. A drag only begins from a press over the
    /// surface, but `down` is the global button state, so letting go
    /// anywhere ends it. Returns the pan for this frame, if it moved.
    pub fn on_pointer(&mut self, pressed_inside: bool, down: bool, pos: Option<Pos2>) -> Option<Vec2> {
        if pressed_inside {
            if let Some(pos) = pos {
                self.begin(pos);
            }
        }
        let delta = pos
            .and_then(|pos| self.drag_to(pos))
            .filter(|d| *d != Vec2::ZERO);
        if !down {
            self.end();
        }
        delta
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, Gesture::Dragging { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::sample;
    use egui::{pos2, vec2};

    fn loaded(natural: Vec2, container: Vec2) -> Viewport {
        let mut vp = Viewport::default();
        vp.on_raster_loaded(natural, Some(container));
        vp
    }

    #[test]
    fn starts_uninitialized() {
        let vp = Viewport::default();
        assert_eq!(vp.phase(), ViewportPhase::Uninitialized);
        assert_eq!(vp.scale(), INITIAL_SCALE);
        assert!(!vp.is_ready());
    }

    #[test]
    fn fit_uses_tighter_axis_with_margin() {
        let vp = loaded(vec2(2000.0, 1000.0), vec2(800.0, 600.0));
        assert_eq!(vp.scale(), 0.4 * FIT_MARGIN);
        assert_eq!(vp.pan(), Vec2::ZERO);
        assert_eq!(vp.phase(), ViewportPhase::FittedToContainer);
    }

    #[test]
    fn fit_is_noop_without_sizes() {
        let mut vp = Viewport::default();
        assert!(!vp.fit_to_container(None, Some(vec2(800.0, 600.0))));
        assert!(!vp.fit_to_container(Some(vec2(800.0, 600.0)), None));
        assert!(!vp.fit_to_container(Some(vec2(0.0, 600.0)), Some(vec2(800.0, 600.0))));
        assert_eq!(vp.phase(), ViewportPhase::Uninitialized);
        assert_eq!(vp.scale(), INITIAL_SCALE);
    }

    #[test]
    fn container_resize_refits_only_before_user_transform() {
        let mut vp = loaded(vec2(1000.0, 1000.0), vec2(500.0, 500.0));
        vp.measure_container(vec2(1000.0, 1000.0));
        assert_eq!(vp.scale(), FIT_MARGIN);

        vp.apply_pan(vec2(5.0, 0.0));
        let before = vp.scale();
        vp.measure_container(vec2(200.0, 200.0));
        assert_eq!(vp.scale(), before);
        assert_eq!(vp.phase(), ViewportPhase::UserTransformed);
    }

    #[test]
    fn raster_before_container_fits_on_first_measure() {
        let mut vp = Viewport::default();
        vp.on_raster_loaded(vec2(400.0, 400.0), None);
        assert!(vp.is_ready());
        assert_eq!(vp.phase(), ViewportPhase::Uninitialized);

        vp.measure_container(vec2(200.0, 200.0));
        assert_eq!(vp.phase(), ViewportPhase::FittedToContainer);
        assert_eq!(vp.scale(), 0.5 * FIT_MARGIN);
    }

    #[test]
    fn zoom_is_clamped_for_extreme_deltas() {
        let mut vp = loaded(vec2(100.0, 100.0), vec2(100.0, 100.0));
        for delta in [1.0e9, -1.0e9, 250.0, -250.0, f32::MAX, f32::MIN] {
            vp.apply_zoom(delta);
            assert!((MIN_SCALE..=MAX_SCALE).contains(&vp.scale()), "delta {delta}");
        }
        vp.apply_zoom(1.0e9);
        assert_eq!(vp.scale(), MIN_SCALE);
        vp.apply_zoom(-1.0e9);
        assert_eq!(vp.scale(), MAX_SCALE);
    }

    #[test]
    fn wheel_down_zooms_out() {
        let mut vp = loaded(vec2(100.0, 100.0), vec2(100.0, 100.0));
        let before = vp.scale();
        vp.apply_zoom(100.0);
        assert!((vp.scale() - (before - 0.1)).abs() < 1e-6);
        assert_eq!(vp.phase(), ViewportPhase::UserTransformed);
    }

    #[test]
    fn clamp_scale_handles_nan() {
        assert_eq!(clamp_scale(f32::NAN), MIN_SCALE);
        assert_eq!(clamp_scale(-3.0), MIN_SCALE);
        assert_eq!(clamp_scale(42.0), MAX_SCALE);
        assert_eq!(clamp_scale(1.0), 1.0);
    }

    #[test]
    fn pinch_is_multiplicative_and_clamped() {
        let mut vp = loaded(vec2(100.0, 100.0), vec2(100.0, 100.0));
        vp.apply_pinch(2.0);
        assert!((vp.scale() - 2.0 * FIT_MARGIN).abs() < 1e-6);
        vp.apply_pinch(1000.0);
        assert_eq!(vp.scale(), MAX_SCALE);
        vp.apply_pinch(-1.0);
        assert_eq!(vp.scale(), MAX_SCALE);
    }

    #[test]
    fn fit_then_recenter_on_rectangle_zooms_to_at_least_selection_scale() {
        let catalog = sample();
        let mut vp = loaded(vec2(4000.0, 3000.0), vec2(800.0, 600.0));
        let region = catalog.get("NH-1").unwrap().geometry.as_ref().unwrap();
        assert!(vp.recenter_on(region));
        assert!(vp.scale() >= SELECT_MIN_SCALE);
        assert_eq!(vp.pan(), vec2(2000.0 - 20.0, 1500.0 - 30.0));
        assert_eq!(vp.phase(), ViewportPhase::Recentered);
    }

    #[test]
    fn recenter_never_zooms_out() {
        let catalog = sample();
        let mut vp = loaded(vec2(100.0, 100.0), vec2(100.0, 100.0));
        vp.zoom_step(4.0);
        let before = vp.scale();
        assert!(before > SELECT_MIN_SCALE);
        vp.recenter_on(catalog.get("NH-2").unwrap().geometry.as_ref().unwrap());
        assert_eq!(vp.scale(), before);
        assert_eq!(vp.pan(), vec2(45.0, 45.0));
    }

    #[test]
    fn recenter_before_raster_load_is_noop() {
        let catalog = sample();
        let mut vp = Viewport::default();
        assert!(!vp.recenter_on(catalog.get("NH-1").unwrap().geometry.as_ref().unwrap()));
        assert_eq!(vp.phase(), ViewportPhase::Uninitialized);
        assert_eq!(vp.pan(), Vec2::ZERO);
    }

    #[test]
    fn manual_interaction_after_recenter_is_user_transformed() {
        let catalog = sample();
        let mut vp = loaded(vec2(100.0, 100.0), vec2(100.0, 100.0));
        vp.recenter_on(catalog.get("NH-1").unwrap().geometry.as_ref().unwrap());
        vp.apply_pan(vec2(1.0, 1.0));
        assert_eq!(vp.phase(), ViewportPhase::UserTransformed);
        assert!(vp.reset_to_fit());
        assert_eq!(vp.phase(), ViewportPhase::FittedToContainer);
    }

    #[test]
    fn drag_accumulates_incremental_deltas() {
        let mut vp = loaded(vec2(100.0, 100.0), vec2(100.0, 100.0));
        vp.apply_pan(vec2(7.0, -3.0));
        let start = vp.pan();

        let mut gesture = Gesture::default();
        gesture.begin(pos2(100.0, 100.0));
        for pos in [pos2(120.0, 110.0), pos2(150.0, 130.0)] {
            if let Some(delta) = gesture.drag_to(pos) {
                vp.apply_pan(delta);
            }
        }
        gesture.end();

        assert_eq!(vp.pan() - start, vec2(50.0, 30.0));
        assert!(!gesture.is_dragging());
    }

    #[test]
    fn moves_without_drag_do_not_pan() {
        let mut gesture = Gesture::default();
        assert_eq!(gesture.drag_to(pos2(10.0, 10.0)), None);
        gesture.begin(pos2(0.0, 0.0));
        gesture.end();
        assert_eq!(gesture.drag_to(pos2(10.0, 10.0)), None);
    }

    #[test]
    fn release_outside_surface_ends_drag() {
        let mut gesture = Gesture::default();
        assert_eq!(gesture.on_pointer(true, true, Some(pos2(10.0, 10.0))), None);
        assert_eq!(gesture.on_pointer(false, true, Some(pos2(30.0, 15.0))), Some(vec2(20.0, 5.0)));
        // Pointer has left the canvas; the button comes up over another widget
        assert_eq!(gesture.on_pointer(false, false, Some(pos2(900.0, 15.0))), Some(vec2(870.0, 0.0)));
        assert!(!gesture.is_dragging());
        // Later moves do nothing
        assert_eq!(gesture.on_pointer(false, false, Some(pos2(950.0, 40.0))), None);
    }

    #[test]
    fn release_with_pointer_gone_ends_drag() {
        let mut gesture = Gesture::default();
        gesture.on_pointer(true, true, Some(pos2(10.0, 10.0)));
        assert_eq!(gesture.on_pointer(false, false, None), None);
        assert!(!gesture.is_dragging());
    }

    #[test]
    fn press_outside_surface_does_not_drag() {
        let mut gesture = Gesture::default();
        assert_eq!(gesture.on_pointer(false, true, Some(pos2(10.0, 10.0))), None);
        assert_eq!(gesture.on_pointer(false, true, Some(pos2(60.0, 60.0))), None);
        assert!(!gesture.is_dragging());
    }

    #[test]
    fn click_without_motion_leaves_viewport_alone() {
        let mut vp = loaded(vec2(100.0, 100.0), vec2(100.0, 100.0));
        let mut gesture = Gesture::default();

        // Press and release in the same frame
        if let Some(delta) = gesture.on_pointer(true, false, Some(pos2(40.0, 40.0))) {
            vp.apply_pan(delta);
        }

        assert!(!gesture.is_dragging());
        assert_eq!(vp.pan(), Vec2::ZERO);
        assert_eq!(vp.phase(), ViewportPhase::FittedToContainer);
    }

    #[test]
    fn screen_and_raster_transforms_are_inverse() {
        let mut vp = loaded(vec2(400.0, 200.0), vec2(200.0, 100.0));
        vp.apply_pan(vec2(13.0, -7.0));
        vp.apply_zoom(-300.0);
        let container = Rect::from_min_size(pos2(50.0, 20.0), vec2(200.0, 100.0));
        let p = pos2(123.0, 45.0);
        let screen = vp.raster_to_screen(p, container).unwrap();
        let back = vp.screen_to_raster(screen, container).unwrap();
        assert!((back - p).length() < 1e-3);
    }

    #[test]
    fn fitted_raster_is_centred_in_container() {
        let vp = loaded(vec2(400.0, 200.0), vec2(200.0, 100.0));
        let container = Rect::from_min_size(pos2(0.0, 0.0), vec2(200.0, 100.0));
        let rect = vp.raster_rect(container).unwrap();
        assert_eq!(rect.center(), container.center());
        assert!(container.contains_rect(rect));
    }

    #[test]
    fn hit_test_maps_screen_to_sheet() {
        let catalog = sample();
        let vp = loaded(vec2(100.0, 100.0), vec2(100.0, 100.0));
        let container = Rect::from_min_size(pos2(0.0, 0.0), vec2(100.0, 100.0));
        let screen = vp.raster_to_screen(pos2(20.0, 30.0), container).unwrap();
        assert_eq!(vp.hit_test(&catalog, screen, container).unwrap().id, "NH-1");
        let empty = vp.raster_to_screen(pos2(90.0, 90.0), container).unwrap();
        assert!(vp.hit_test(&catalog, empty, container).is_none());
    }
}
