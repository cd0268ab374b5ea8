use crate::{
    error::{Error, Result},
    glyph::{self, GLYPH_ADVANCE, GLYPH_HEIGHT},
    record::Task,
};
use chrono::{Duration, NaiveDateTime};
use image::{Rgb, RgbImage};
use serde::Serialize;
use std::{fs, path::Path};
use tracing::{debug, warn};

const DEFAULT_WIDTH: u32 = 1200;
const DEFAULT_ROW_HEIGHT: u32 = 28;
const DEFAULT_TICK_COUNT: u32 = 6;

const MARGIN: u32 = 20;
const AXIS_HEIGHT: u32 = 40;
const FONT_SCALE: u32 = 2;
const LABEL_ELLIPSIS: &str = "..";

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const STRIPE: Rgb<u8> = Rgb([246, 247, 250]);
const GRID: Rgb<u8> = Rgb([222, 225, 230]);
const AXIS: Rgb<u8> = Rgb([60, 60, 60]);
const TEXT: Rgb<u8> = Rgb([40, 40, 40]);

/// Bar colours, cycled per row.
pub const PALETTE: [Rgb<u8>; 8] = [
    Rgb([99, 110, 250]),
    Rgb([239, 85, 59]),
    Rgb([0, 204, 150]),
    Rgb([171, 99, 250]),
    Rgb([255, 161, 90]),
    Rgb([25, 211, 243]),
    Rgb([255, 102, 146]),
    Rgb([182, 232, 128]),
];

/// Geometry settings for the rendered chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartOptions {
    /// Image width in pixels
    pub width: u32,

    /// Height of one task row in pixels
    pub row_height: u32,

    /// Number of labelled ticks on the time axis
    pub tick_count: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            row_height: DEFAULT_ROW_HEIGHT,
            tick_count: DEFAULT_TICK_COUNT,
        }
    }
}

/// Pixel rectangle, inclusive of `x0`/`y0` and exclusive of `x1`/`y1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    /// Left edge
    pub x0: u32,
    /// Top edge
    pub y0: u32,
    /// Right edge (exclusive)
    pub x1: u32,
    /// Bottom edge (exclusive)
    pub y1: u32,
}

impl Rect {
    /// Centre pixel of the rectangle.
    #[must_use]
    pub const fn center(&self) -> (u32, u32) {
        ((self.x0 + self.x1) / 2, (self.y0 + self.y1) / 2)
    }
}

/// Computed geometry of a chart for a given task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartLayout {
    /// Image width
    pub width: u32,
    /// Image height
    pub height: u32,
    /// Plot area (right of the label gutter, above the axis)
    pub plot: Rect,
    /// Pixels per task row
    pub row_height: u32,
    /// Number of rows drawn
    pub rows: u32,
    /// Earliest and latest timestamp on the axis, `None` when there are no tasks
    pub range: Option<(NaiveDateTime, NaiveDateTime)>,
}

impl ChartLayout {
    /// Computes the layout for `tasks`.
    #[must_use]
    pub fn new(tasks: &[Task], options: &ChartOptions) -> Self {
        let rows = u32::try_from(tasks.len()).unwrap_or(u32::MAX).max(1);
        let height = rows
            .saturating_mul(options.row_height)
            .saturating_add(MARGIN + AXIS_HEIGHT);

        let longest = tasks
            .iter()
            .map(|t| glyph::text_width(&t.name, FONT_SCALE))
            .max()
            .unwrap_or(0);
        let gutter = (longest + 2 * MARGIN).min(options.width / 3);

        let plot = Rect {
            x0: gutter,
            y0: MARGIN,
            x1: options.width.saturating_sub(MARGIN).max(gutter + 1),
            y1: height.saturating_sub(AXIS_HEIGHT),
        };

        Self {
            width: options.width,
            height,
            plot,
            row_height: options.row_height,
            rows,
            range: time_range(tasks),
        }
    }

    /// Horizontal pixel of `t` on the time axis.
    #[must_use]
    pub fn x_of(&self, t: NaiveDateTime) -> u32 {
        let Some((start, end)) = self.range else {
            return self.plot.x0;
        };

        let span = (end - start).num_milliseconds().max(1) as f64;
        let offset = (t - start).num_milliseconds() as f64;
        let ratio = (offset / span).clamp(0.0, 1.0);
        let plot_width = f64::from(self.plot.x1 - self.plot.x0);

        self.plot.x0 + (ratio * plot_width).round() as u32
    }

    /// Rectangle of row `row`.
    #[must_use]
    pub fn row_rect(&self, row: u32) -> Rect {
        let y0 = self.plot.y0 + row * self.row_height;
        Rect {
            x0: self.plot.x0,
            y0,
            x1: self.plot.x1,
            y1: y0 + self.row_height,
        }
    }

    /// Rectangle of the bar for `task` drawn in row `row`.
    #[must_use]
    pub fn bar_rect(&self, row: u32, task: &Task) -> Rect {
        let row_rect = self.row_rect(row);
        let pad = self.row_height / 5;
        let (begin, finish) = task.span();
        let x0 = self.x_of(begin);
        let x1 = self.x_of(finish).max(x0 + 2).min(self.plot.x1.max(x0 + 2));

        Rect {
            x0,
            y0: row_rect.y0 + pad,
            x1,
            y1: row_rect.y1 - pad,
        }
    }

    /// Axis ticks as (pixel, label).
    #[must_use]
    pub fn ticks(&self, count: u32) -> Vec<(u32, String)> {
        let Some((start, end)) = self.range else {
            return Vec::new();
        };

        let span = end - start;
        let format = if span > Duration::days(1) {
            "%d-%m %H:%M"
        } else {
            "%H:%M:%S"
        };
        let steps = i32::try_from(count.max(2) - 1).unwrap_or(i32::MAX);

        (0..=steps)
            .map(|k| {
                let t = start + span * k / steps;
                (self.x_of(t), t.format(format).to_string())
            })
            .collect()
    }
}

fn time_range(tasks: &[Task]) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let start = tasks.iter().map(|t| t.span().0).min()?;
    let end = tasks.iter().map(|t| t.span().1).max()?;

    if end > start {
        Some((start, end))
    } else {
        Some((start, start + Duration::seconds(1)))
    }
}

/// Draws tasks as a horizontal bar timeline.
#[derive(Debug, Clone, Default)]
pub struct ChartRenderer {
    options: ChartOptions,
}

impl ChartRenderer {
    /// Creates a renderer with the given geometry.
    #[must_use]
    pub const fn new(options: ChartOptions) -> Self {
        Self { options }
    }

    /// Computes the layout used for `tasks`.
    #[must_use]
    pub fn layout(&self, tasks: &[Task]) -> ChartLayout {
        ChartLayout::new(tasks, &self.options)
    }

    /// Renders `tasks` into an image, first task on the top row.
    #[must_use]
    pub fn render(&self, tasks: &[Task]) -> RgbImage {
        let layout = self.layout(tasks);
        let mut img = RgbImage::from_pixel(layout.width, layout.height, BACKGROUND);

        for row in (1..layout.rows).step_by(2) {
            fill_rect(&mut img, layout.row_rect(row), STRIPE);
        }

        let ticks = layout.ticks(self.options.tick_count);
        for (x, _) in &ticks {
            fill_rect(
                &mut img,
                Rect {
                    x0: *x,
                    y0: layout.plot.y0,
                    x1: x + 1,
                    y1: layout.plot.y1,
                },
                GRID,
            );
        }

        let gutter_chars =
            layout.plot.x0.saturating_sub(2 * MARGIN) / (GLYPH_ADVANCE * FONT_SCALE);
        let text_offset = layout.row_height.saturating_sub(GLYPH_HEIGHT * FONT_SCALE) / 2;

        for (row, task) in (0..).zip(tasks) {
            let color = PALETTE[row as usize % PALETTE.len()];
            fill_rect(&mut img, layout.bar_rect(row, task), color);

            let label = fit_label(&task.name, gutter_chars as usize);
            let y = layout.row_rect(row).y0 + text_offset;
            draw_text(&mut img, MARGIN, y, &label, TEXT);
        }

        fill_rect(
            &mut img,
            Rect {
                x0: layout.plot.x0,
                y0: layout.plot.y1,
                x1: layout.plot.x1,
                y1: layout.plot.y1 + 1,
            },
            AXIS,
        );
        fill_rect(
            &mut img,
            Rect {
                x0: layout.plot.x0,
                y0: layout.plot.y0,
                x1: layout.plot.x0 + 1,
                y1: layout.plot.y1,
            },
            AXIS,
        );

        let label_y = layout.plot.y1 + 8;
        for (x, label) in &ticks {
            let w = glyph::text_width(label, FONT_SCALE);
            let left = x
                .saturating_sub(w / 2)
                .min(layout.width.saturating_sub(w));
            draw_text(&mut img, left, label_y, label, TEXT);
        }

        if tasks.is_empty() {
            let message = "no tasks";
            let w = glyph::text_width(message, FONT_SCALE);
            let (cx, cy) = layout.plot.center();
            draw_text(
                &mut img,
                cx.saturating_sub(w / 2),
                cy.saturating_sub(GLYPH_HEIGHT * FONT_SCALE / 2),
                message,
                AXIS,
            );
        }

        img
    }

    /// Renders `tasks` and saves the image; the format follows the
    /// extension of `path`. Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The parent directory cannot be created
    /// - The extension is not a supported image format
    /// - Encoding or writing fails
    pub fn write(&self, tasks: &[Task], path: &Path) -> Result<()> {
        if tasks.is_empty() {
            warn!("No tasks to draw; writing an empty chart");
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let img = self.render(tasks);
        img.save(path).map_err(|e| Error::render(path, e))?;

        debug!(
            "Wrote {}x{} chart with {} tasks to {}",
            img.width(),
            img.height(),
            tasks.len(),
            path.display()
        );
        Ok(())
    }
}

fn fit_label(name: &str, max_chars: usize) -> String {
    let count = name.chars().count();
    if count <= max_chars {
        return name.to_string();
    }
    if max_chars <= LABEL_ELLIPSIS.len() {
        return name.chars().take(max_chars).collect();
    }

    let mut label: String = name.chars().take(max_chars - LABEL_ELLIPSIS.len()).collect();
    label.push_str(LABEL_ELLIPSIS);
    label
}

fn fill_rect(img: &mut RgbImage, rect: Rect, color: Rgb<u8>) {
    let x1 = rect.x1.min(img.width());
    let y1 = rect.y1.min(img.height());
    for y in rect.y0..y1 {
        for x in rect.x0..x1 {
            img.put_pixel(x, y, color);
        }
    }
}

fn draw_text(img: &mut RgbImage, x: u32, y: u32, text: &str, color: Rgb<u8>) {
    let mut cursor = x;
    for c in text.chars() {
        for (dy, bits) in (0..).zip(glyph::glyph(c)) {
            for dx in 0..glyph::GLYPH_WIDTH {
                if bits & (0x10 >> dx) != 0 {
                    fill_rect(
                        img,
                        Rect {
                            x0: cursor + dx * FONT_SCALE,
                            y0: y + dy * FONT_SCALE,
                            x1: cursor + (dx + 1) * FONT_SCALE,
                            y1: y + (dy + 1) * FONT_SCALE,
                        },
                        color,
                    );
                }
            }
        }
        cursor += GLYPH_ADVANCE * FONT_SCALE;
    }
}
