//! Canvas 2D drawing of a [`Scene`].
//!
//! Draw order: backdrop + grid, connection lines, nodes (glow, starburst,
//! core), sparks, bolts, logo border, logo text.

use std::collections::HashMap;
use std::f64::consts::TAU;

use glam::DVec2;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

use super::layout::background_grid;
use super::scene::{Node, Scene};
use crate::error::{NetworkError, Result};

const STARBURST_RADIUS: f64 = 60.0;
const STARBURST_SPIKES: usize = 25;
const LINE_COLOR: u32 = 0x66f0ff;
const GRID_COLOR: u32 = 0x0b1016;
const BORDER_COLOR: u32 = 0x00c8ff;

/// `rgba(...)` for a 0xRRGGBB colour.
pub fn rgba(color: u32, alpha: f64) -> String {
    let r = (color >> 16) & 0xff;
    let g = (color >> 8) & 0xff;
    let b = color & 0xff;
    format!("rgba({},{},{},{})", r, g, b, alpha.clamp(0.0, 1.0))
}

pub struct Renderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    /// Pre-rendered starburst per node colour.
    starbursts: HashMap<u32, HtmlCanvasElement>,
}

impl Renderer {
    pub fn new(doc: &Document, canvas: HtmlCanvasElement, scene: &mut Scene) -> Result<Self> {
        let ctx = context_2d(&canvas)?;
        let mut starbursts = HashMap::new();
        for node in &scene.nodes {
            if !starbursts.contains_key(&node.color) {
                starbursts.insert(node.color, starburst_texture(doc, node.color)?);
            }
        }
        let renderer = Self { canvas, ctx, starbursts };
        renderer.measure_logo(scene)?;
        Ok(renderer)
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Replace the estimated logo extent with the measured text size.
    fn measure_logo(&self, scene: &mut Scene) -> Result<()> {
        self.ctx.set_font(&scene.config.logo_font());
        let metrics = self.ctx.measure_text(&scene.config.logo_text)?;
        let height = scene.config.logo_font_size * 1.15;
        scene.logo.set_extent(metrics.width(), height);
        log::debug!("logo measured {:.0}x{:.0}", metrics.width(), height);
        Ok(())
    }

    pub fn draw(&self, scene: &Scene) -> Result<()> {
        let ctx = &self.ctx;
        let (w, h) = (self.canvas.width() as f64, self.canvas.height() as f64);
        ctx.set_global_composite_operation("source-over")?;
        ctx.set_global_alpha(1.0);
        ctx.clear_rect(0.0, 0.0, w, h);

        self.draw_background(scene, w, h);
        self.draw_connections(scene);
        for node in &scene.nodes {
            self.draw_node(node)?;
        }
        self.draw_sparks(scene)?;

        ctx.set_global_composite_operation("lighter")?;
        self.draw_bolts(scene);
        self.draw_border(scene);
        ctx.set_global_composite_operation("source-over")?;
        self.draw_logo(scene)?;
        Ok(())
    }

    fn draw_background(&self, scene: &Scene, w: f64, h: f64) {
        let ctx = &self.ctx;
        ctx.set_fill_style_str("rgba(0,0,0,0.25)");
        ctx.fill_rect(0.0, 0.0, w, h);
        ctx.set_stroke_style_str(&rgba(GRID_COLOR, 0.06));
        ctx.set_line_width(1.0);
        ctx.begin_path();
        for (a, b) in background_grid(w, h, scene.config.grid_step) {
            ctx.move_to(a.x, a.y);
            ctx.line_to(b.x, b.y);
        }
        ctx.stroke();
    }

    fn draw_connections(&self, scene: &Scene) {
        let ctx = &self.ctx;
        ctx.set_stroke_style_str(&rgba(LINE_COLOR, 0.05));
        ctx.set_line_width(1.0);
        ctx.begin_path();
        for c in &scene.connections {
            let (a, b) = (scene.nodes[c.a].pos, scene.nodes[c.b].pos);
            ctx.move_to(a.x, a.y);
            ctx.line_to(b.x, b.y);
        }
        ctx.stroke();
    }

    fn draw_node(&self, node: &Node) -> Result<()> {
        let ctx = &self.ctx;
        ctx.save();
        ctx.translate(node.pos.x, node.pos.y)?;

        if node.glow_alpha > 0.0 {
            ctx.set_global_alpha(node.glow_alpha.clamp(0.0, 1.0));
            ctx.set_fill_style_str(&rgba(node.color, 0.16));
            circle(ctx, DVec2::ZERO, node.glow_radius * node.glow_scale)?;
        }

        if node.star_alpha > 0.0 {
            if let Some(tex) = self.starbursts.get(&node.color) {
                ctx.save();
                ctx.set_global_alpha(node.star_alpha.clamp(0.0, 1.0));
                ctx.rotate(node.star_rotation)?;
                ctx.scale(node.star_scale, node.star_scale)?;
                let (tw, th) = (tex.width() as f64, tex.height() as f64);
                ctx.draw_image_with_html_canvas_element_and_dw_and_dh(tex, -tw / 2.0, -th / 2.0, tw, th)?;
                ctx.restore();
            }
        }

        ctx.set_global_alpha(1.0);
        ctx.set_fill_style_str(&rgba(node.color, node.core_alpha));
        circle(ctx, DVec2::ZERO, node.core_radius * node.core_scale)?;
        ctx.restore();
        Ok(())
    }

    fn draw_sparks(&self, scene: &Scene) -> Result<()> {
        for s in &scene.sparks {
            self.ctx.set_fill_style_str(&rgba(0xffffff, s.alpha));
            circle(&self.ctx, s.pos, s.radius)?;
        }
        Ok(())
    }

    fn draw_bolts(&self, scene: &Scene) {
        let ctx = &self.ctx;
        ctx.set_stroke_style_str(&rgba(LINE_COLOR, 0.06));
        ctx.set_line_width(6.0);
        for bolt in &scene.bolts {
            polyline(ctx, &bolt.points(scene.config.bolt_segments));
        }
    }

    fn draw_border(&self, scene: &Scene) {
        let path = scene.border.path();
        if path.is_empty() {
            return;
        }
        self.ctx.set_stroke_style_str(&rgba(BORDER_COLOR, 0.9));
        self.ctx.set_line_width(4.0);
        polyline(&self.ctx, path);
    }

    fn draw_logo(&self, scene: &Scene) -> Result<()> {
        let logo = &scene.logo;
        if logo.alpha <= 0.0 {
            return Ok(());
        }
        let ctx = &self.ctx;
        ctx.save();
        ctx.set_global_alpha(logo.alpha.clamp(0.0, 1.0));
        ctx.translate(logo.center.x, logo.center.y)?;
        ctx.scale(logo.scale, logo.scale)?;
        ctx.set_font(&scene.config.logo_font());
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        ctx.set_fill_style_str("#ffffff");
        ctx.fill_text(&scene.config.logo_text, 0.0, 0.0)?;
        ctx.restore();
        Ok(())
    }
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d> {
    canvas
        .get_context("2d")?
        .ok_or(NetworkError::NoContext)?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| NetworkError::NoContext)
}

/// Render the radial spike shape once to an offscreen canvas.
fn starburst_texture(doc: &Document, color: u32) -> Result<HtmlCanvasElement> {
    let tex: HtmlCanvasElement = doc
        .create_element("canvas")?
        .dyn_into()
        .map_err(|_| NetworkError::Js("created element is not a canvas".into()))?;
    let side = (STARBURST_RADIUS * 2.0 + 4.0) as u32;
    tex.set_width(side);
    tex.set_height(side);
    let ctx = context_2d(&tex)?;
    let c = side as f64 / 2.0;
    ctx.set_stroke_style_str(&rgba(color, 1.0));
    ctx.set_line_width(2.0);
    ctx.begin_path();
    for i in 0..STARBURST_SPIKES {
        let a = i as f64 * TAU / STARBURST_SPIKES as f64;
        ctx.move_to(c, c);
        ctx.line_to(c + a.cos() * STARBURST_RADIUS, c + a.sin() * STARBURST_RADIUS);
    }
    ctx.stroke();
    Ok(tex)
}

fn circle(ctx: &CanvasRenderingContext2d, at: DVec2, radius: f64) -> Result<()> {
    ctx.begin_path();
    ctx.arc(at.x, at.y, radius.max(0.0), 0.0, TAU)?;
    ctx.fill();
    Ok(())
}

fn polyline(ctx: &CanvasRenderingContext2d, pts: &[DVec2]) {
    let Some((first, rest)) = pts.split_first() else {
        return;
    };
    ctx.begin_path();
    ctx.move_to(first.x, first.y);
    for p in rest {
        ctx.line_to(p.x, p.y);
    }
    ctx.stroke();
}
