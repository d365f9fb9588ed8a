use std::rc::Rc;

use crate::defaults::SURFACE_SIZE;
use crate::geometry::ChartGeometry;
use crate::model::{LadderState, Offset, Row, Table};
use crate::style::ChartStyle;
use crate::svg::{document, escape_xml, points_attr};

struct Cached<K> {
    key: K,
    markup: String,
}

#[derive(Default)]
struct LayerCache {
    frame: Option<Cached<usize>>,
    top_labels: Option<Cached<(Row<String>, Row<Offset>)>>,
    guides: Option<Cached<usize>>,
    values: Option<Cached<(usize, Row<f64>)>>,
    level_labels: Option<Cached<(usize, Table<String>, Table<Offset>)>>,
    rebuilds: usize,
}

fn cached<'a, K>(
    slot: &'a mut Option<Cached<K>>,
    key: K,
    same: impl Fn(&K, &K) -> bool,
    rebuilds: &mut usize,
    build: impl FnOnce() -> String,
) -> &'a str {
    let fresh = slot.as_ref().is_some_and(|c| same(&c.key, &key));
    if !fresh {
        *rebuilds += 1;
        *slot = Some(Cached {
            key,
            markup: build(),
        });
    }
    slot.as_ref().map(|c| c.markup.as_str()).unwrap_or_default()
}

pub struct ChartRenderer {
    style: ChartStyle,
    size: f64,
    cache: LayerCache,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new(ChartStyle::default(), SURFACE_SIZE)
    }
}

impl ChartRenderer {
    pub fn new(style: ChartStyle, size: f64) -> Self {
        Self {
            style,
            size,
            cache: LayerCache::default(),
        }
    }

    pub fn style(&self) -> &ChartStyle {
        &self.style
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn set_style(&mut self, style: ChartStyle) {
        self.style = style;
        self.cache = LayerCache::default();
    }

    /// Number of layer rebuilds since construction or the last style change.
    pub fn layer_rebuilds(&self) -> usize {
        self.cache.rebuilds
    }

    /// Renders a standalone SVG document for `state`.
    pub fn render(&mut self, state: &LadderState) -> String {
        let geometry = ChartGeometry::for_state(state, self.size);
        let style = &self.style;
        let cache = &mut self.cache;
        let n = state.axis_count();
        let mut body = String::new();

        body.push_str(cached(
            &mut cache.frame,
            n,
            |a, b| a == b,
            &mut cache.rebuilds,
            || frame_layer(&geometry, style),
        ));
        body.push_str(cached(
            &mut cache.top_labels,
            (
                Rc::clone(&state.top_labels),
                Rc::clone(&state.top_label_offsets),
            ),
            |a, b| Rc::ptr_eq(&a.0, &b.0) && Rc::ptr_eq(&a.1, &b.1),
            &mut cache.rebuilds,
            || top_label_layer(&geometry, state, style),
        ));
        body.push_str(cached(
            &mut cache.guides,
            n,
            |a, b| a == b,
            &mut cache.rebuilds,
            || guide_layer(&geometry, style),
        ));
        body.push_str(cached(
            &mut cache.values,
            (n, Rc::clone(&state.values)),
            |a, b| a.0 == b.0 && Rc::ptr_eq(&a.1, &b.1),
            &mut cache.rebuilds,
            || value_layer(&geometry, state, style),
        ));
        body.push_str(cached(
            &mut cache.level_labels,
            (
                n,
                Rc::clone(&state.level_labels),
                Rc::clone(&state.level_label_offsets),
            ),
            |a, b| a.0 == b.0 && Rc::ptr_eq(&a.1, &b.1) && Rc::ptr_eq(&a.2, &b.2),
            &mut cache.rebuilds,
            || level_label_layer(&geometry, state, style),
        ));

        document(self.size, &style.background_color, &body)
    }
}

fn frame_layer(geometry: &ChartGeometry, style: &ChartStyle) -> String {
    let stroke = escape_xml(&style.frame_color);
    let mut svg = String::from(r#"<g class="frame">"#);
    svg.push_str(&format!(
        r#"<polygon points="{}" fill="none" stroke="{}" stroke-width="{:.2}" />"#,
        points_attr(&geometry.encompassing_polygon_points()),
        stroke,
        style.frame_stroke_width,
    ));
    for (from, to) in geometry.radial_lines() {
        svg.push_str(&format!(
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{:.2}" />"#,
            from.x, from.y, to.x, to.y, stroke, style.frame_stroke_width,
        ));
    }
    svg.push_str("</g>");
    svg
}

#[allow(clippy::too_many_arguments)]
fn text_element(
    svg: &mut String,
    x: f64,
    y: f64,
    text: &str,
    font_family: &str,
    font_size: f32,
    font_weight: Option<u16>,
    fill: &str,
    data: &str,
) {
    let weight_attr = font_weight
        .map(|w| format!(r#" font-weight="{}""#, w))
        .unwrap_or_default();
    svg.push_str(&format!(
        r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" dominant-baseline="middle" font-family="{}" font-size="{:.2}"{} fill="{}" {}>{}</text>"#,
        x,
        y,
        escape_xml(font_family),
        font_size,
        weight_attr,
        escape_xml(fill),
        data,
        escape_xml(text),
    ));
}

fn top_label_layer(geometry: &ChartGeometry, state: &LadderState, style: &ChartStyle) -> String {
    let mut svg = String::from(r#"<g class="top-labels">"#);
    for (axis, label) in state.top_labels.iter().enumerate() {
        let anchor = geometry.top_label_anchor(axis, state.top_label_offset(axis));
        text_element(
            &mut svg,
            anchor.x,
            anchor.y,
            label,
            &style.font_family,
            style.top_label_font_size,
            Some(style.top_label_font_weight),
            &style.text_color,
            &format!(r#"data-axis="{}""#, axis),
        );
    }
    svg.push_str("</g>");
    svg
}

fn guide_layer(geometry: &ChartGeometry, style: &ChartStyle) -> String {
    let stroke = escape_xml(&style.guide_color);
    let mut svg = String::from(r#"<g class="guides">"#);
    for level in 0..geometry.levels {
        svg.push_str(&format!(
            r#"<polygon points="{}" fill="none" stroke="{}" stroke-dasharray="4" opacity="{:.2}" />"#,
            points_attr(&geometry.level_polygon_points(level)),
            stroke,
            style.guide_opacity,
        ));
    }
    svg.push_str(&format!(
        r#"<polygon points="{}" fill="none" stroke="{}" stroke-dasharray="4" />"#,
        points_attr(&geometry.outline_points()),
        stroke,
    ));
    svg.push_str("</g>");
    svg
}

fn value_layer(geometry: &ChartGeometry, state: &LadderState, style: &ChartStyle) -> String {
    let points = geometry.value_polygon_points(&state.values);
    let mut svg = String::from(r#"<g class="values">"#);
    svg.push_str(&format!(
        r#"<polygon points="{}" fill="{}" fill-opacity="{:.2}" stroke="{}" stroke-width="{:.2}" />"#,
        points_attr(&points),
        escape_xml(&style.value_fill_color),
        style.value_fill_opacity,
        escape_xml(&style.value_stroke_color),
        style.value_stroke_width,
    ));
    // Invisible drag targets.
    for (axis, p) in points.iter().enumerate() {
        svg.push_str(&format!(
            r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="none" stroke="none" data-handle="{}" />"#,
            p.x, p.y, style.handle_radius, axis,
        ));
    }
    svg.push_str("</g>");
    svg
}

fn level_label_layer(geometry: &ChartGeometry, state: &LadderState, style: &ChartStyle) -> String {
    let mut svg = String::from(r#"<g class="level-labels">"#);
    for axis in 0..state.axis_count() {
        let labels = state.level_label_row(axis);
        let offsets = state.level_label_offset_row(axis);
        for (level, (label, offset)) in labels.iter().zip(offsets.iter()).enumerate() {
            let anchor = geometry.level_label_anchor(axis, level, *offset);
            text_element(
                &mut svg,
                anchor.x,
                anchor.y,
                label,
                &style.font_family,
                style.level_label_font_size,
                None,
                &style.text_color,
                &format!(r#"data-axis="{}" data-level="{}""#, axis, level),
            );
        }
    }
    svg.push_str("</g>");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Ladder;

    #[test]
    fn renders_every_layer_in_paint_order() {
        let svg = ChartRenderer::default().render(&LadderState::default());

        let order = ["frame", "top-labels", "guides", "values", "level-labels"]
            .map(|class| svg.find(&format!(r#"class="{}""#, class)).unwrap());
        assert!(order.windows(2).all(|w| w[0] < w[1]));

        assert_eq!(svg.matches("<polygon").count(), 1 + 5 + 1 + 1);
        assert_eq!(svg.matches("<line").count(), 5);
        assert_eq!(svg.matches("<circle").count(), 5);
        assert_eq!(svg.matches("<text").count(), 5 + 25);
        assert!(svg.contains(">Technology</text>"));
        assert!(svg.contains(">Multiple Teams</text>"));
        assert!(svg.contains(r##"fill="#f9fafb""##));
    }

    #[test]
    fn top_label_includes_offset() {
        let svg = ChartRenderer::default().render(&LadderState::default());
        // tip (200, 8) plus offset (-3, -16)
        assert!(svg.contains(r#"<text x="197.00" y="-8.00""#));
    }

    #[test]
    fn label_text_is_escaped() {
        let mut ladder = Ladder::default();
        ladder.set_axis_label(0, "R&D <core>").unwrap();
        let svg = ChartRenderer::default().render(ladder.state());
        assert!(svg.contains(">R&amp;D &lt;core&gt;</text>"));
    }

    #[test]
    fn malformed_level_rows_render_placeholders() {
        let mut ladder = Ladder::default();
        ladder.replace_all(crate::snapshot::PartialSnapshot {
            level_labels: Some(vec![vec!["x".to_string()]; 5]),
            ..Default::default()
        });
        let svg = ChartRenderer::default().render(ladder.state());
        assert_eq!(svg.matches(">Level 3</text>").count(), 5);
    }

    #[test]
    fn only_layers_with_changed_inputs_are_rebuilt() {
        let mut ladder = Ladder::default();
        let mut renderer = ChartRenderer::default();

        renderer.render(ladder.state());
        assert_eq!(renderer.layer_rebuilds(), 5);

        renderer.render(ladder.state());
        assert_eq!(renderer.layer_rebuilds(), 5);

        ladder.set_axis_value(1, 2.2).unwrap();
        renderer.render(ladder.state());
        assert_eq!(renderer.layer_rebuilds(), 6);

        ladder
            .set_level_label_offset(0, 0, Offset::new(1.0, 1.0))
            .unwrap();
        let svg = renderer.render(ladder.state());
        assert_eq!(renderer.layer_rebuilds(), 7);
        assert_eq!(svg, ChartRenderer::default().render(ladder.state()));
    }

    #[test]
    fn style_change_invalidates_layers() {
        let mut renderer = ChartRenderer::default();
        let state = LadderState::default();
        renderer.render(&state);
        renderer.set_style(ChartStyle::from_builtin("nord").unwrap());
        let svg = renderer.render(&state);
        assert_eq!(renderer.layer_rebuilds(), 5);
        assert!(svg.contains(r##"fill="#2e3440""##));
    }

    #[test]
    fn style_colors_are_escaped_in_attributes() {
        let quoted = r#"#000" onload="x&"#;
        let style = ChartStyle {
            frame_color: quoted.to_string(),
            guide_color: quoted.to_string(),
            value_fill_color: quoted.to_string(),
            value_stroke_color: quoted.to_string(),
            text_color: quoted.to_string(),
            ..ChartStyle::default()
        };
        let svg = ChartRenderer::new(style, SURFACE_SIZE).render(&LadderState::default());

        assert!(!svg.contains("onload=\""));
        let escaped = "#000&quot; onload=&quot;x&amp;";
        assert!(svg.contains(&format!(r#"stroke="{}" stroke-width"#, escaped)));
        assert!(svg.contains(&format!(r#"stroke="{}" stroke-dasharray"#, escaped)));
        assert!(svg.contains(&format!(r#"fill="{}" fill-opacity"#, escaped)));
        assert!(svg.contains(&format!(r#"fill="{}" data-axis"#, escaped)));
    }
}
