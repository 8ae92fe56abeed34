//! Route map embed.
//!
//! Each turn on screen shows the path of one upcoming departure's route
//! pattern, cycling through the departure list one step per turn.
//!
//! # Rendering Pipeline
//!
//! 1. Fetch the pattern geometry from the transit API
//! 2. Project every coordinate to Web Mercator
//! 3. Remap into the embed surface, padded by a tenth of its height
//! 4. Draw the polyline onto a freshly filled background
//!
//! # Caching
//!
//! Rendered routes are kept in a [`LineCache`] keyed by pattern code, so the
//! API is hit once per pattern rather than once per frame. The whole cache is
//! dropped when the surface size changes or the local date rolls over, since
//! patterns can change between service days. A failed fetch caches nothing;
//! that pattern draws nothing and is not fetched again for [`RETRY_DELAY`].

use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::Text;
use time::{Date, OffsetDateTime};
use tracing::{debug, error};

use super::Embed;
use crate::colors::{EMBED_BACKGROUND, NYSSE_BLUE, WHITE};
use crate::fonts::SizedFont;
use crate::geometry::{PlanarPoint, project, remap_points};
use crate::styles::LEFT_MIDDLE;
use crate::surface::Surface;
use crate::transit::{PatternSource, Stoptime};
use crate::widgets::{draw_route_badge, draw_route_line, fit_text};

/// Registry name of [`LineEmbed`].
pub const NAME: &str = "lines";

const DURATION: Duration = Duration::from_secs(15);

/// Route stroke width is the surface height divided by this, at least 2 px.
const LINE_WIDTH_DIVISOR: u32 = 60;

/// How long a pattern whose render failed is skipped before trying again.
pub const RETRY_DELAY: time::Duration = time::Duration::seconds(30);

/// Rendered route surfaces for one surface size and one day.
#[derive(Default)]
pub struct LineCache {
    surfaces: HashMap<String, Surface>,
    /// When each uncached pattern last failed to render.
    failed: HashMap<String, OffsetDateTime>,
    size: Option<Size>,
    cleared_on: Option<Date>,
}

impl LineCache {
    pub fn new() -> Self { Self::default() }

    /// Cached surface for `key`, rendering it with `render` on a miss.
    ///
    /// Everything cached is dropped first if `size` or the date of `now`
    /// differ from the previous call. A miss whose render returns `None`
    /// stores nothing and returns `None`; `render` is then not called again
    /// for that key until [`RETRY_DELAY`] has passed.
    pub fn get_or_insert_with<F>(&mut self, key: &str, size: Size, now: OffsetDateTime, render: F) -> Option<&Surface>
    where
        F: FnOnce() -> Option<Surface>,
    {
        let today = now.date();
        if self.size != Some(size) || self.cleared_on != Some(today) {
            if !self.surfaces.is_empty() {
                debug!(entries = self.surfaces.len(), "clearing line cache");
            }
            self.surfaces.clear();
            self.failed.clear();
            self.size = Some(size);
            self.cleared_on = Some(today);
        }

        if !self.surfaces.contains_key(key) {
            if self.failed.get(key).is_some_and(|failed_at| now - *failed_at < RETRY_DELAY) {
                return None;
            }
            match render() {
                Some(surface) => {
                    self.failed.remove(key);
                    self.surfaces.insert(key.to_owned(), surface);
                }
                None => {
                    self.failed.insert(key.to_owned(), now);
                    return None;
                }
            }
        }
        self.surfaces.get(key)
    }

    pub fn len(&self) -> usize { self.surfaces.len() }

    pub fn is_empty(&self) -> bool { self.surfaces.is_empty() }
}

/// Fetch, project and draw one pattern onto a new surface of `size`.
///
/// Returns `None` after logging an error if the geometry can't be fetched.
pub fn render_line_for_pattern<S>(source: &S, pattern_code: &str, size: Size) -> Option<Surface>
where
    S: PatternSource + ?Sized,
{
    let padding = f64::from(size.height) / 10.0;

    let geometry = match source.fetch_pattern_geometry(pattern_code) {
        Ok(geometry) => geometry,
        Err(e) => {
            error!(pattern_code, "failed to fetch line geometry: {e}");
            return None;
        }
    };

    let projected: Vec<PlanarPoint> = geometry.points.iter().copied().map(project).collect();
    let pixels: Vec<Point> = remap_points(&projected, size, padding)
        .into_iter()
        .map(PlanarPoint::to_pixel)
        .collect();
    debug!(pattern_code, points = pixels.len(), "rendered line");

    let mut surface = Surface::filled(size, EMBED_BACKGROUND);
    let color = geometry.route.color.unwrap_or(NYSSE_BLUE);
    draw_route_line(&mut surface, &pixels, color, (size.height / LINE_WIDTH_DIVISOR).max(2));
    Some(surface)
}

/// Shows the route of each upcoming departure in turn.
pub struct LineEmbed<S> {
    source: Rc<S>,
    line_index: usize,
    departures: Vec<Stoptime>,
    cache: LineCache,
    label_font: SizedFont,
}

impl<S: PatternSource> LineEmbed<S> {
    /// `args` come from an `enabled_embeds` entry like `lines:foo`; none are used.
    pub fn new(source: Rc<S>, args: &[&str]) -> Self {
        if !args.is_empty() {
            debug!(?args, "lines embed ignores arguments");
        }
        Self {
            source,
            line_index: 0,
            departures: Vec::new(),
            cache: LineCache::new(),
            label_font: SizedFont::new("line label"),
        }
    }
}

impl<S: PatternSource> Embed for LineEmbed<S> {
    fn name(&self) -> &'static str { NAME }

    fn on_enable(&mut self) {}

    fn on_disable(&mut self) { self.line_index = self.line_index.wrapping_add(1); }

    fn update_departures(&mut self, departures: &[Stoptime]) { self.departures = departures.to_vec(); }

    fn render(&mut self, surface: &mut Surface, content_spacing: u32, time: OffsetDateTime, _progress: f32) {
        if self.departures.is_empty() {
            return;
        }
        self.line_index %= self.departures.len();
        let departure = &self.departures[self.line_index];
        let size = surface.size();
        let source = self.source.as_ref();

        let Some(route) = self.cache.get_or_insert_with(&departure.pattern_code, size, time, || {
            render_line_for_pattern(source, &departure.pattern_code, size)
        }) else {
            return;
        };
        route.blit(surface, Point::zero()).ok();

        // Label: [badge] headsign, top-left
        let spacing = content_spacing as i32;
        let label_height = (size.height / 8).max(1);
        let font = self.label_font.get_size(label_height);
        let badge_width = 4 * (font.character_size.width + font.character_spacing);
        let badge = Rectangle::new(Point::new(spacing, spacing), Size::new(badge_width, label_height));
        draw_route_badge(surface, badge, &departure.route, font);

        let text_x = spacing * 2 + badge_width as i32;
        let available = (size.width as i32 - text_x - spacing).max(0) as u32;
        Text::with_text_style(
            fit_text(&departure.headsign, font, available),
            Point::new(text_x, badge.center().y),
            MonoTextStyle::new(font, WHITE),
            LEFT_MIDDLE,
        )
        .draw(surface)
        .ok();
    }

    fn requested_duration(&self) -> Duration { DURATION }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use embedded_graphics::pixelcolor::Rgb565;
    use time::macros::datetime;
    use tracing::Level;
    use tracing_subscriber::Layer;
    use tracing_subscriber::layer::{Context, SubscriberExt};

    use super::*;
    use crate::colors::parse_hex_color;
    use crate::geometry::Coordinate;
    use crate::transit::{FetchError, PatternGeometry, RouteInfo};

    struct FakePatterns {
        fail: Cell<bool>,
        fetched: RefCell<Vec<String>>,
    }

    impl FakePatterns {
        fn new() -> Self {
            Self {
                fail: Cell::new(false),
                fetched: RefCell::new(Vec::new()),
            }
        }

        fn fetch_count(&self) -> usize { self.fetched.borrow().len() }
    }

    impl PatternSource for FakePatterns {
        fn fetch_pattern_geometry(&self, code: &str) -> Result<PatternGeometry, FetchError> {
            self.fetched.borrow_mut().push(code.to_owned());
            if self.fail.get() {
                return Err(FetchError::Graphql("timeout".into()));
            }
            Ok(PatternGeometry {
                code: code.to_owned(),
                route: RouteInfo {
                    short_name: "3".into(),
                    color: parse_hex_color("FFFF00"),
                },
                points: vec![Coordinate::new(23.0, 61.0), Coordinate::new(24.0, 62.0)],
            })
        }
    }

    fn departure(pattern: &str) -> Stoptime {
        Stoptime {
            headsign: "Hervanta".into(),
            route: RouteInfo {
                short_name: "3".into(),
                color: None,
            },
            pattern_code: pattern.into(),
            service_day: 0,
            scheduled_departure: 0,
            realtime_departure: 0,
            realtime: false,
        }
    }

    const SIZE: Size = Size::new(200, 100);
    const NOON: OffsetDateTime = datetime!(2024-03-01 12:00 UTC);

    // -------------------------------------------------------------------------
    // LineCache
    // -------------------------------------------------------------------------

    #[test]
    fn test_cache_hit_does_not_rerender() {
        let mut cache = LineCache::new();
        let renders = Cell::new(0);
        let render = || {
            renders.set(renders.get() + 1);
            Some(Surface::new(SIZE))
        };

        assert!(cache.get_or_insert_with("a", SIZE, NOON, render).is_some());
        assert!(cache.get_or_insert_with("a", SIZE, NOON, render).is_some());
        assert_eq!(renders.get(), 1);
    }

    #[test]
    fn test_cache_cleared_on_size_change() {
        let mut cache = LineCache::new();
        cache.get_or_insert_with("a", SIZE, NOON, || Some(Surface::new(SIZE)));
        cache.get_or_insert_with("b", SIZE, NOON, || Some(Surface::new(SIZE)));
        assert_eq!(cache.len(), 2);

        let bigger = Size::new(400, 200);
        cache.get_or_insert_with("a", bigger, NOON, || Some(Surface::new(bigger)));
        assert_eq!(cache.len(), 1, "resize clears every entry");
    }

    #[test]
    fn test_cache_cleared_on_new_day() {
        let mut cache = LineCache::new();
        let renders = Cell::new(0);
        let render = || {
            renders.set(renders.get() + 1);
            Some(Surface::new(SIZE))
        };

        cache.get_or_insert_with("a", SIZE, datetime!(2024-03-01 23:59 UTC), render);
        cache.get_or_insert_with("a", SIZE, datetime!(2024-03-02 00:00 UTC), render);
        assert_eq!(renders.get(), 2);
    }

    #[test]
    fn test_cache_failed_render_not_stored() {
        let mut cache = LineCache::new();

        assert!(cache.get_or_insert_with("a", SIZE, NOON, || None).is_none());
        assert!(cache.is_empty());

        let later = NOON + RETRY_DELAY;
        assert!(cache.get_or_insert_with("a", SIZE, later, || Some(Surface::new(SIZE))).is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_failed_render_waits_before_retry() {
        let mut cache = LineCache::new();
        let renders = Cell::new(0);
        let failing = || {
            renders.set(renders.get() + 1);
            None
        };

        cache.get_or_insert_with("a", SIZE, NOON, failing);
        cache.get_or_insert_with("a", SIZE, NOON + time::Duration::seconds(1), failing);
        cache.get_or_insert_with("a", SIZE, NOON + RETRY_DELAY - time::Duration::SECOND, failing);
        assert_eq!(renders.get(), 1, "failed pattern is skipped until the delay passes");

        // Other patterns are unaffected
        assert!(cache.get_or_insert_with("b", SIZE, NOON, || Some(Surface::new(SIZE))).is_some());

        cache.get_or_insert_with("a", SIZE, NOON + RETRY_DELAY, failing);
        assert_eq!(renders.get(), 2);
    }

    #[test]
    fn test_cache_resize_forgets_failures() {
        let mut cache = LineCache::new();
        cache.get_or_insert_with("a", SIZE, NOON, || None);

        let bigger = Size::new(400, 200);
        assert!(cache.get_or_insert_with("a", bigger, NOON, || Some(Surface::new(bigger))).is_some());
    }

    // -------------------------------------------------------------------------
    // render_line_for_pattern
    // -------------------------------------------------------------------------

    #[test]
    fn test_render_line_draws_padded_route() {
        let source = FakePatterns::new();
        let surface = render_line_for_pattern(&source, "p1", SIZE).unwrap();

        assert_eq!(surface.size(), SIZE);
        assert_eq!(surface.pixel(Point::new(0, 0)), Some(EMBED_BACKGROUND));
        // padding = 10: first point maps to bottom-left, last to top-right
        assert_eq!(surface.pixel(Point::new(10, 90)), Some(Rgb565::YELLOW));
        assert_eq!(surface.pixel(Point::new(190, 10)), Some(Rgb565::YELLOW));
    }

    #[test]
    fn test_render_line_fetch_failure() {
        let source = FakePatterns::new();
        source.fail.set(true);
        assert!(render_line_for_pattern(&source, "p1", SIZE).is_none());
        assert_eq!(source.fetch_count(), 1);
    }

    // -------------------------------------------------------------------------
    // LineEmbed
    // -------------------------------------------------------------------------

    #[test]
    fn test_embed_contract() {
        let embed = LineEmbed::new(Rc::new(FakePatterns::new()), &[]);
        assert_eq!(embed.name(), "lines");
        assert_eq!(embed.requested_duration(), Duration::from_secs(15));
    }

    #[test]
    fn test_no_departures_draws_nothing() {
        let source = Rc::new(FakePatterns::new());
        let mut embed = LineEmbed::new(Rc::clone(&source), &[]);
        let mut surface = Surface::new(SIZE);

        embed.render(&mut surface, 4, NOON, 0.0);
        assert_eq!(surface.opaque_pixel_count(), 0);
        assert_eq!(source.fetch_count(), 0);
    }

    #[test]
    fn test_render_fetches_each_pattern_once() {
        let source = Rc::new(FakePatterns::new());
        let mut embed = LineEmbed::new(Rc::clone(&source), &[]);
        embed.update_departures(&[departure("p1"), departure("p2")]);

        let mut surface = Surface::new(SIZE);
        embed.render(&mut surface, 4, NOON, 0.0);
        embed.render(&mut surface, 4, NOON, 0.5);
        assert_eq!(*source.fetched.borrow(), ["p1"]);
        assert_eq!(surface.pixel(Point::new(199, 50)), Some(EMBED_BACKGROUND));
    }

    #[test]
    fn test_on_disable_advances_and_wraps() {
        let source = Rc::new(FakePatterns::new());
        let mut embed = LineEmbed::new(Rc::clone(&source), &[]);
        embed.update_departures(&[departure("p1"), departure("p2")]);
        let mut surface = Surface::new(SIZE);

        for _ in 0..3 {
            embed.on_enable();
            embed.render(&mut surface, 4, NOON, 0.0);
            embed.on_disable();
        }
        assert_eq!(*source.fetched.borrow(), ["p1", "p2"], "p1 comes from cache on wrap");
    }

    #[test]
    fn test_failed_fetch_leaves_surface_untouched() {
        let source = Rc::new(FakePatterns::new());
        source.fail.set(true);
        let mut embed = LineEmbed::new(Rc::clone(&source), &[]);
        embed.update_departures(&[departure("p1")]);

        let mut surface = Surface::new(SIZE);
        embed.render(&mut surface, 4, NOON, 0.0);
        assert_eq!(surface.opaque_pixel_count(), 0);

        source.fail.set(false);
        embed.render(&mut surface, 4, NOON, 0.1);
        assert_eq!(source.fetch_count(), 1, "no refetch within the retry delay");
        assert_eq!(surface.opaque_pixel_count(), 0);

        embed.render(&mut surface, 4, NOON + RETRY_DELAY, 0.2);
        assert_eq!(source.fetch_count(), 2, "failed pattern is retried");
        assert!(surface.opaque_pixel_count() > 0);
    }

    /// Counts ERROR events seen while installed.
    struct ErrorCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for ErrorCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::ERROR {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn test_failed_fetch_logs_one_error() {
        let errors = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(ErrorCounter(Arc::clone(&errors)));

        let source = Rc::new(FakePatterns::new());
        source.fail.set(true);
        let mut embed = LineEmbed::new(Rc::clone(&source), &[]);
        embed.update_departures(&[departure("p1")]);
        let mut surface = Surface::new(SIZE);

        tracing::subscriber::with_default(subscriber, || {
            embed.render(&mut surface, 4, NOON, 0.0);
            assert_eq!(errors.load(Ordering::SeqCst), 1);

            // Frames inside the retry delay stay quiet
            for secs in 1..10 {
                embed.render(&mut surface, 4, NOON + time::Duration::seconds(secs), 0.0);
            }
            assert_eq!(errors.load(Ordering::SeqCst), 1);

            embed.render(&mut surface, 4, NOON + RETRY_DELAY, 0.0);
            assert_eq!(errors.load(Ordering::SeqCst), 2);
        });
        assert_eq!(source.fetch_count(), 2);
    }
}
