//! # SVG Reader
//!
//! Parses the SVG produced by the barcode encoders into path commands the
//! PDF surface can replay. Barcode SVGs are flat: a background rect and a
//! run of bar rects (linear codes) or a module path (QR). The subset covered
//! here is rect, line, polyline, polygon, path and g, with fill/stroke
//! inheritance through groups. Path commands: M, L, H, V, C, Q, Z (absolute
//! and relative).
//!
//! The drawing's [`ViewBox`] is taken from the root element (`viewBox`, then
//! `width`/`height`), falling back to the bounds of the geometry. The surface
//! maps that box onto the target rectangle.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// The user-space rectangle an SVG drawing occupies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

/// Drawing commands produced by the SVG parser. Coordinates are SVG user
/// units, y pointing down.
#[derive(Debug, Clone, PartialEq)]
pub enum SvgCommand {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    CurveTo(f64, f64, f64, f64, f64, f64),
    ClosePath,
    SetFill(f64, f64, f64),
    SetStroke(f64, f64, f64),
    SetStrokeWidth(f64),
    Fill,
    Stroke,
    FillAndStroke,
    SaveState,
    RestoreState,
}

/// A parsed SVG document.
#[derive(Debug, Clone)]
pub struct SvgDrawing {
    pub view_box: ViewBox,
    pub commands: Vec<SvgCommand>,
}

type Rgb = (f64, f64, f64);

/// Paint state inherited through `<g>` elements.
#[derive(Debug, Clone, Copy)]
struct Paint {
    fill: Option<Rgb>,
    stroke: Option<Rgb>,
    stroke_width: f64,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            fill: Some((0.0, 0.0, 0.0)),
            stroke: None,
            stroke_width: 1.0,
        }
    }
}

/// Parse an SVG document from raw bytes.
pub fn parse_svg_bytes(data: &[u8]) -> Result<SvgDrawing, String> {
    let content = std::str::from_utf8(data).map_err(|e| format!("SVG is not UTF-8: {}", e))?;
    parse_svg(content)
}

/// Parse an SVG document into drawing commands and its view box.
pub fn parse_svg(content: &str) -> Result<SvgDrawing, String> {
    let mut reader = Reader::from_str(content);
    let mut commands = Vec::new();
    let mut paint_stack = vec![Paint::default()];
    let mut declared_box: Option<ViewBox> = None;
    let mut buf = Vec::new();

    loop {
        let (element, is_start) = match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => (e.into_owned(), true),
            Ok(Event::Empty(e)) => (e.into_owned(), false),
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"g" && paint_stack.len() > 1 {
                    paint_stack.pop();
                    commands.push(SvgCommand::RestoreState);
                }
                buf.clear();
                continue;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "invalid SVG at byte {}: {}",
                    reader.buffer_position(),
                    e
                ))
            }
            _ => {
                buf.clear();
                continue;
            }
        };
        buf.clear();

        let inherited = paint_stack.last().copied().unwrap_or_default();
        let paint = resolve_paint(&element, inherited);

        match element.name().as_ref() {
            b"svg" => {
                declared_box = get_attr(&element, "viewBox")
                    .and_then(|v| parse_view_box(&v))
                    .or_else(|| {
                        let width = get_attr_f64(&element, "width")?;
                        let height = get_attr_f64(&element, "height")?;
                        Some(ViewBox {
                            min_x: 0.0,
                            min_y: 0.0,
                            width,
                            height,
                        })
                    });
            }
            b"g" if is_start => {
                commands.push(SvgCommand::SaveState);
                paint_stack.push(paint);
            }
            b"rect" => {
                let x = get_attr_f64(&element, "x").unwrap_or(0.0);
                let y = get_attr_f64(&element, "y").unwrap_or(0.0);
                let w = get_attr_f64(&element, "width").unwrap_or(0.0);
                let h = get_attr_f64(&element, "height").unwrap_or(0.0);
                if w > 0.0 && h > 0.0 {
                    emit_shape(
                        &mut commands,
                        paint,
                        vec![
                            SvgCommand::MoveTo(x, y),
                            SvgCommand::LineTo(x + w, y),
                            SvgCommand::LineTo(x + w, y + h),
                            SvgCommand::LineTo(x, y + h),
                            SvgCommand::ClosePath,
                        ],
                    );
                }
            }
            b"line" => {
                let x1 = get_attr_f64(&element, "x1").unwrap_or(0.0);
                let y1 = get_attr_f64(&element, "y1").unwrap_or(0.0);
                let x2 = get_attr_f64(&element, "x2").unwrap_or(0.0);
                let y2 = get_attr_f64(&element, "y2").unwrap_or(0.0);
                // Lines only stroke.
                let paint = Paint { fill: None, ..paint };
                emit_shape(
                    &mut commands,
                    paint,
                    vec![SvgCommand::MoveTo(x1, y1), SvgCommand::LineTo(x2, y2)],
                );
            }
            tag @ (b"polyline" | b"polygon") => {
                let points = parse_points(&get_attr(&element, "points").unwrap_or_default());
                if let Some((&(x0, y0), rest)) = points.split_first() {
                    let mut path = vec![SvgCommand::MoveTo(x0, y0)];
                    path.extend(rest.iter().map(|&(x, y)| SvgCommand::LineTo(x, y)));
                    if tag == b"polygon" {
                        path.push(SvgCommand::ClosePath);
                    }
                    emit_shape(&mut commands, paint, path);
                }
            }
            b"path" => {
                let path = parse_path_d(&get_attr(&element, "d").unwrap_or_default());
                if !path.is_empty() {
                    emit_shape(&mut commands, paint, path);
                }
            }
            _ => {}
        }
    }

    let view_box = match declared_box.filter(|vb| vb.width > 0.0 && vb.height > 0.0) {
        Some(vb) => vb,
        None => geometry_bounds(&commands).ok_or_else(|| "SVG has no drawable content".to_string())?,
    };

    Ok(SvgDrawing { view_box, commands })
}

/// Parse a viewBox string like "0 0 100 100" (commas allowed).
pub fn parse_view_box(s: &str) -> Option<ViewBox> {
    let parts: Vec<f64> = s
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .filter_map(|p| p.parse::<f64>().ok())
        .collect();
    match parts[..] {
        [min_x, min_y, width, height] => Some(ViewBox {
            min_x,
            min_y,
            width,
            height,
        }),
        _ => None,
    }
}

/// Bounding box of every point the commands visit.
fn geometry_bounds(commands: &[SvgCommand]) -> Option<ViewBox> {
    let mut min = (f64::INFINITY, f64::INFINITY);
    let mut max = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    let mut visit = |x: f64, y: f64| {
        min = (min.0.min(x), min.1.min(y));
        max = (max.0.max(x), max.1.max(y));
    };
    for cmd in commands {
        match *cmd {
            SvgCommand::MoveTo(x, y) | SvgCommand::LineTo(x, y) => visit(x, y),
            SvgCommand::CurveTo(x1, y1, x2, y2, x, y) => {
                visit(x1, y1);
                visit(x2, y2);
                visit(x, y);
            }
            _ => {}
        }
    }
    let (width, height) = (max.0 - min.0, max.1 - min.1);
    if width > 0.0 && height > 0.0 {
        Some(ViewBox {
            min_x: min.0,
            min_y: min.1,
            width,
            height,
        })
    } else {
        None
    }
}

fn resolve_paint(e: &BytesStart, inherited: Paint) -> Paint {
    let pick = |attr: &str, current: Option<Rgb>| match get_attr(e, attr).as_deref() {
        Some("none") => None,
        Some(value) => parse_svg_color(value).or(current),
        None => current,
    };
    Paint {
        fill: pick("fill", inherited.fill),
        stroke: pick("stroke", inherited.stroke),
        stroke_width: get_attr_f64(e, "stroke-width").unwrap_or(inherited.stroke_width),
    }
}

fn emit_shape(commands: &mut Vec<SvgCommand>, paint: Paint, path: Vec<SvgCommand>) {
    let paint_op = match (paint.fill.is_some(), paint.stroke.is_some()) {
        (true, true) => SvgCommand::FillAndStroke,
        (true, false) => SvgCommand::Fill,
        (false, true) => SvgCommand::Stroke,
        (false, false) => return,
    };

    commands.push(SvgCommand::SaveState);
    if let Some((r, g, b)) = paint.fill {
        commands.push(SvgCommand::SetFill(r, g, b));
    }
    if let Some((r, g, b)) = paint.stroke {
        commands.push(SvgCommand::SetStroke(r, g, b));
        commands.push(SvgCommand::SetStrokeWidth(paint.stroke_width));
    }
    commands.extend(path);
    commands.push(paint_op);
    commands.push(SvgCommand::RestoreState);
}

/// Parse an SVG path `d` attribute into drawing commands.
fn parse_path_d(d: &str) -> Vec<SvgCommand> {
    let tokens = tokenize_path(d);
    let mut commands = Vec::new();
    let (mut cur_x, mut cur_y) = (0.0f64, 0.0f64);
    let (mut start_x, mut start_y) = (0.0f64, 0.0f64);
    let mut i = 0;

    // Reads `n` numbers at `i` if they're all there.
    let take = |i: usize, n: usize| -> Option<Vec<f64>> {
        tokens
            .get(i..i + n)?
            .iter()
            .map(|t| t.parse::<f64>().ok())
            .collect()
    };

    while i < tokens.len() {
        let op = tokens[i].as_str();
        i += 1;
        let relative = op.chars().all(|c| c.is_ascii_lowercase());

        match op {
            "M" | "m" => {
                let mut first = true;
                while let Some(n) = take(i, 2) {
                    let (bx, by) = if relative { (cur_x, cur_y) } else { (0.0, 0.0) };
                    cur_x = bx + n[0];
                    cur_y = by + n[1];
                    if first {
                        start_x = cur_x;
                        start_y = cur_y;
                        commands.push(SvgCommand::MoveTo(cur_x, cur_y));
                        first = false;
                    } else {
                        // Extra pairs after a moveto are implicit linetos.
                        commands.push(SvgCommand::LineTo(cur_x, cur_y));
                    }
                    i += 2;
                }
            }
            "L" | "l" => {
                while let Some(n) = take(i, 2) {
                    let (bx, by) = if relative { (cur_x, cur_y) } else { (0.0, 0.0) };
                    cur_x = bx + n[0];
                    cur_y = by + n[1];
                    commands.push(SvgCommand::LineTo(cur_x, cur_y));
                    i += 2;
                }
            }
            "H" | "h" => {
                while let Some(n) = take(i, 1) {
                    cur_x = if relative { cur_x + n[0] } else { n[0] };
                    commands.push(SvgCommand::LineTo(cur_x, cur_y));
                    i += 1;
                }
            }
            "V" | "v" => {
                while let Some(n) = take(i, 1) {
                    cur_y = if relative { cur_y + n[0] } else { n[0] };
                    commands.push(SvgCommand::LineTo(cur_x, cur_y));
                    i += 1;
                }
            }
            "C" | "c" => {
                while let Some(n) = take(i, 6) {
                    let (bx, by) = if relative { (cur_x, cur_y) } else { (0.0, 0.0) };
                    let (x, y) = (bx + n[4], by + n[5]);
                    commands.push(SvgCommand::CurveTo(
                        bx + n[0],
                        by + n[1],
                        bx + n[2],
                        by + n[3],
                        x,
                        y,
                    ));
                    cur_x = x;
                    cur_y = y;
                    i += 6;
                }
            }
            "Q" | "q" => {
                while let Some(n) = take(i, 4) {
                    let (bx, by) = if relative { (cur_x, cur_y) } else { (0.0, 0.0) };
                    let (qx, qy) = (bx + n[0], by + n[1]);
                    let (x, y) = (bx + n[2], by + n[3]);
                    // Quadratic → cubic.
                    commands.push(SvgCommand::CurveTo(
                        cur_x + (2.0 / 3.0) * (qx - cur_x),
                        cur_y + (2.0 / 3.0) * (qy - cur_y),
                        x + (2.0 / 3.0) * (qx - x),
                        y + (2.0 / 3.0) * (qy - y),
                        x,
                        y,
                    ));
                    cur_x = x;
                    cur_y = y;
                    i += 4;
                }
            }
            "Z" | "z" => {
                commands.push(SvgCommand::ClosePath);
                cur_x = start_x;
                cur_y = start_y;
            }
            _ => {}
        }
    }

    commands
}

/// Split a path `d` string into command letters and numbers.
fn tokenize_path(d: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    let flush = |current: &mut String, tokens: &mut Vec<String>| {
        if !current.is_empty() {
            tokens.push(std::mem::take(current));
        }
    };

    for ch in d.chars() {
        match ch {
            'e' | 'E' if !current.is_empty() => current.push(ch),
            c if c.is_ascii_alphabetic() => {
                flush(&mut current, &mut tokens);
                tokens.push(c.to_string());
            }
            // A sign starts a new number unless it follows an exponent.
            '-' | '+' if !current.is_empty() && !current.ends_with(['e', 'E']) => {
                flush(&mut current, &mut tokens);
                current.push(ch);
            }
            c if c.is_ascii_digit() || c == '.' || c == '-' || c == '+' => current.push(c),
            _ => flush(&mut current, &mut tokens),
        }
    }
    flush(&mut current, &mut tokens);

    tokens
}

/// Parse an SVG color string (hex, rgb(), a few named colors).
fn parse_svg_color(s: &str) -> Option<Rgb> {
    let s = s.trim();
    let channel = |hex: &str| u8::from_str_radix(hex, 16).ok().map(|v| f64::from(v) / 255.0);
    if let Some(hex) = s.strip_prefix('#') {
        match hex.len() {
            3 => Some((
                channel(&hex[0..1].repeat(2))?,
                channel(&hex[1..2].repeat(2))?,
                channel(&hex[2..3].repeat(2))?,
            )),
            // Alpha, when present, is ignored.
            6 | 8 => Some((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
            _ => None,
        }
    } else if let Some(inner) = s
        .strip_prefix("rgb(")
        .or_else(|| s.strip_prefix("rgba("))
        .and_then(|r| r.strip_suffix(')'))
    {
        let parts: Vec<f64> = inner
            .split(',')
            .filter_map(|p| p.trim().parse::<f64>().ok())
            .collect();
        match parts[..] {
            [r, g, b] | [r, g, b, _] => Some((r / 255.0, g / 255.0, b / 255.0)),
            _ => None,
        }
    } else {
        match s.to_ascii_lowercase().as_str() {
            "black" => Some((0.0, 0.0, 0.0)),
            "white" => Some((1.0, 1.0, 1.0)),
            "red" => Some((1.0, 0.0, 0.0)),
            "green" => Some((0.0, 0.502, 0.0)),
            "blue" => Some((0.0, 0.0, 1.0)),
            "gray" | "grey" => Some((0.502, 0.502, 0.502)),
            _ => None,
        }
    }
}

/// Parse SVG points attribute (e.g., "10,20 30,40").
fn parse_points(s: &str) -> Vec<(f64, f64)> {
    let nums: Vec<f64> = s
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<f64>().ok())
        .collect();

    nums.chunks_exact(2).map(|c| (c[0], c[1])).collect()
}

fn get_attr(e: &BytesStart, name: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == name.as_bytes())
        .and_then(|attr| String::from_utf8(attr.value.to_vec()).ok())
}

fn get_attr_f64(e: &BytesStart, name: &str) -> Option<f64> {
    get_attr(e, name).and_then(|s| s.trim().trim_end_matches("px").parse::<f64>().ok())
}
