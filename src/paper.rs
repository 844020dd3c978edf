use image::Rgb;

use crate::layout::{LayoutConstants, MINIMUM_PITCH};
use crate::style::PaperBackground;
use crate::surface::Surface;

pub const PAPER_COLOR: Rgb<u8> = Rgb([0xff, 0xfd, 0xf5]);
pub const RULE_COLOR: Rgb<u8> = Rgb([0xc8, 0xc8, 0xdc]);
pub const GRID_COLOR: Rgb<u8> = Rgb([0xdc, 0xdc, 0xe6]);
pub const MARGIN_RULE_COLOR: Rgb<u8> = Rgb([0xdc, 0x64, 0x64]);

pub const RULE_WIDTH: f32 = 0.5;
pub const MARGIN_RULE_WIDTH: f32 = 1.5;

/// Fills the page with the paper color and prints the motif of the chosen paper over it.
pub fn paint_paper<S: Surface + ?Sized>(
    surface: &mut S,
    paper: PaperBackground,
    constants: &LayoutConstants,
) {
    surface.fill_background(PAPER_COLOR);

    match paper {
        PaperBackground::Ruled => paint_ruling(surface, constants),
        PaperBackground::Graph => paint_grid(surface, constants),
        PaperBackground::Margin => {
            paint_ruling(surface, constants);
            paint_margin_rule(surface, constants);
        }
    }
}

/// One horizontal rule under every line of text, across the whole column.
fn paint_ruling<S: Surface + ?Sized>(surface: &mut S, constants: &LayoutConstants) {
    if constants.line_height < MINIMUM_PITCH {
        log::warn!("Skipping the ruling, the line height is {}", constants.line_height);
        return;
    }
    let left = constants.margin;
    let right = constants.page_width as f32 - constants.margin;
    let mut y = constants.first_baseline + constants.rule_offset;
    while y < constants.motif_end_y() {
        surface.stroke_line((left, y), (right, y), RULE_WIDTH, RULE_COLOR);
        y += constants.line_height;
    }
}

fn paint_grid<S: Surface + ?Sized>(surface: &mut S, constants: &LayoutConstants) {
    if constants.graph_pitch < MINIMUM_PITCH {
        log::warn!("Skipping the grid, the graph pitch is {}", constants.graph_pitch);
        return;
    }
    let left = constants.margin;
    let right = constants.page_width as f32 - constants.margin;
    let top = constants.motif_top;
    let bottom = constants.motif_end_y();

    let mut y = top;
    while y < bottom {
        surface.stroke_line((left, y), (right, y), RULE_WIDTH, GRID_COLOR);
        y += constants.graph_pitch;
    }
    let mut x = left;
    while x < right {
        surface.stroke_line((x, top), (x, bottom), RULE_WIDTH, GRID_COLOR);
        x += constants.graph_pitch;
    }
}

fn paint_margin_rule<S: Surface + ?Sized>(surface: &mut S, constants: &LayoutConstants) {
    let x = constants.margin_rule_x();
    surface.stroke_line(
        (x, constants.motif_top),
        (x, constants.motif_end_y()),
        MARGIN_RULE_WIDTH,
        MARGIN_RULE_COLOR,
    );
}
