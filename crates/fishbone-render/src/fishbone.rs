//! Hand-laid-out "standard fishbone" canvas: spine, head, angled major bones, and stacked
//! sub-cause text blocks.

use crate::model::{
    BoneLayout, BoneSide, FishboneLayout, HeadLayout, LayoutPoint, SpineLayout, TextBlockLayout,
    TextLineKind, TextLineLayout,
};
use crate::text::{TextMeasurer, TextStyle, wrap_text_lines};
use crate::{Error, Result, clamp_to_arity};
use fishbone_core::{CanvasSettings, CausalTaxonomy, Degradation, MajorCategory, RenderSettings};

const SPINE_START_X: f64 = 0.5;
const HEAD_MARGIN: f64 = 0.2;
const HEAD_WIDTH: f64 = 2.4;
const HEAD_HEIGHT: f64 = 1.6;
const HEAD_CORNER_RADIUS: f64 = 0.2;
const HEAD_PADDING: f64 = 0.1;
/// Distance kept between a bone tip and the top/bottom canvas edge.
const BONE_EDGE_MARGIN: f64 = 1.6;
/// Horizontal lean of a bone as a fraction of the slot spacing.
const BONE_LEAN: f64 = 0.35;
const DETAIL_GAP_X: f64 = 0.12;
const DETAIL_GAP_Y: f64 = 0.35;
/// Vertical room reserved next to the bone tip for the category label.
const LABEL_RESERVE: f64 = 0.45;
const LABEL_OFFSET: f64 = 0.12;
const ROOT_CAUSE_INDENT: f64 = 0.14;
const BASELINE_RATIO: f64 = 0.8;

const PROBLEM_FONT: f64 = 0.2;
const CATEGORY_FONT: f64 = 0.22;
const SUBCAUSE_FONT: f64 = 0.14;
const ROOT_CAUSE_FONT: f64 = 0.12;

const SUBCAUSE_BULLET: &str = "• ";
const ROOT_CAUSE_BULLET: &str = "– ";
const ELLIPSIS: &str = "…";

/// Computes the fishbone canvas for `taxonomy`.
///
/// Categories with index below `ceil(arity / 2)` attach to the top half of the spine, the rest
/// to the bottom half; categories beyond `arity` are dropped and reported. Fewer categories
/// leave their slots empty.
pub fn layout_fishbone(
    taxonomy: &CausalTaxonomy,
    settings: &RenderSettings,
    measurer: &dyn TextMeasurer,
) -> Result<(FishboneLayout, Vec<Degradation>)> {
    let arity = settings.major_category_arity;
    validate_canvas(&settings.canvas)?;
    let (taxonomy, degradations) = clamp_to_arity(taxonomy, arity)?;

    let width = settings.canvas.width;
    let height = settings.canvas.height;
    let spine_y = height / 2.0;
    let head_x = width - HEAD_MARGIN - HEAD_WIDTH;
    let spine = SpineLayout {
        start: LayoutPoint::new(SPINE_START_X, spine_y),
        end: LayoutPoint::new(head_x, spine_y),
    };

    let top_slots = arity.div_ceil(2);
    let bottom_slots = arity - top_slots;
    let step = (spine.end.x - spine.start.x) / (top_slots as f64 + 1.0);
    let bone_dx = step * BONE_LEAN;
    let bone_dy = (spine_y - BONE_EDGE_MARGIN).max(DETAIL_GAP_Y + LABEL_RESERVE);
    let detail_width = (step - bone_dx - 2.0 * DETAIL_GAP_X).max(0.5);
    let detail_height = (bone_dy - DETAIL_GAP_Y - LABEL_RESERVE).max(0.0);

    let bones = taxonomy
        .categories
        .iter()
        .enumerate()
        .map(|(index, category)| {
            let (side, slot) = if index < top_slots {
                (BoneSide::Top, index)
            } else {
                (BoneSide::Bottom, index - top_slots)
            };
            let dir = match side {
                BoneSide::Top => -1.0,
                BoneSide::Bottom => 1.0,
            };
            let x = spine.start.x + (slot as f64 + 1.0) * step;
            let start = LayoutPoint::new(x, spine_y);
            let end = LayoutPoint::new(x - bone_dx, spine_y + dir * bone_dy);

            let label_y = match side {
                BoneSide::Top => end.y - LABEL_OFFSET,
                BoneSide::Bottom => end.y + LABEL_OFFSET + CATEGORY_FONT,
            };
            let label_line = TextLineLayout {
                text: category.label.clone(),
                x: end.x,
                y: label_y,
                font_size: CATEGORY_FONT,
                kind: TextLineKind::Category,
            };

            let detail = detail_block(
                category,
                x + DETAIL_GAP_X,
                spine_y,
                side,
                detail_width,
                detail_height,
                measurer,
            );

            BoneLayout {
                index,
                side,
                slot,
                label: category.label.clone(),
                start,
                end,
                label_line,
                detail,
            }
        })
        .collect();

    let head = head_layout(&taxonomy.problem_statement, head_x, spine_y, measurer);

    tracing::debug!(arity, top_slots, bottom_slots, "laid out fishbone canvas");

    Ok((
        FishboneLayout {
            width,
            height,
            arity,
            top_slots,
            bottom_slots,
            spine,
            head,
            bones,
        },
        degradations,
    ))
}

fn validate_canvas(canvas: &CanvasSettings) -> Result<()> {
    let ok = canvas.width.is_finite()
        && canvas.height.is_finite()
        && canvas.width >= CanvasSettings::MIN_WIDTH
        && canvas.height >= CanvasSettings::MIN_HEIGHT;
    if ok {
        Ok(())
    } else {
        Err(Error::invalid_config(format!(
            "canvas must be at least {} x {} units, got {} x {}",
            CanvasSettings::MIN_WIDTH,
            CanvasSettings::MIN_HEIGHT,
            canvas.width,
            canvas.height
        )))
    }
}

fn line_height(measurer: &dyn TextMeasurer, style: &TextStyle) -> f64 {
    measurer.measure("", style).height
}

fn head_layout(
    problem_statement: &str,
    head_x: f64,
    spine_y: f64,
    measurer: &dyn TextMeasurer,
) -> HeadLayout {
    let style = TextStyle::bold(PROBLEM_FONT);
    let lh = line_height(measurer, &style);
    let max_lines = (((HEAD_HEIGHT - HEAD_PADDING) / lh).floor() as usize).max(1);

    let mut lines = wrap_text_lines(
        problem_statement,
        &style,
        HEAD_WIDTH - 2.0 * HEAD_PADDING,
        measurer,
    );
    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            last.pop();
            last.push_str(ELLIPSIS);
        }
    }

    let center_x = head_x + HEAD_WIDTH / 2.0;
    let first_baseline = spine_y - (lines.len() as f64 * lh) / 2.0 + lh * BASELINE_RATIO;
    let lines = lines
        .into_iter()
        .enumerate()
        .map(|(i, text)| TextLineLayout {
            text,
            x: center_x,
            y: first_baseline + i as f64 * lh,
            font_size: PROBLEM_FONT,
            kind: TextLineKind::Problem,
        })
        .collect();

    HeadLayout {
        x: head_x,
        y: spine_y - HEAD_HEIGHT / 2.0,
        width: HEAD_WIDTH,
        height: HEAD_HEIGHT,
        corner_radius: HEAD_CORNER_RADIUS,
        lines,
    }
}

struct PendingLine {
    text: String,
    indent: f64,
    font_size: f64,
    kind: TextLineKind,
}

/// Stacks a category's subcauses and root causes as wrapped text lines.
///
/// The block sits beside the bone's spine end and reads top-down on both sides: above the
/// spine its bottom edge is anchored, below the spine its top edge is.
fn detail_block(
    category: &MajorCategory,
    x: f64,
    spine_y: f64,
    side: BoneSide,
    max_width: f64,
    max_height: f64,
    measurer: &dyn TextMeasurer,
) -> TextBlockLayout {
    let sub_style = TextStyle {
        font_size: SUBCAUSE_FONT,
        font_weight: Some("600".to_string()),
    };
    let root_style = TextStyle::sized(ROOT_CAUSE_FONT);
    let sub_bullet = measurer.measure(SUBCAUSE_BULLET, &sub_style).width;
    let root_bullet = measurer.measure(ROOT_CAUSE_BULLET, &root_style).width;

    let mut pending: Vec<PendingLine> = Vec::new();
    for sub in &category.subcauses {
        let wrapped = wrap_text_lines(&sub.label, &sub_style, max_width - sub_bullet, measurer);
        for (i, line) in wrapped.into_iter().enumerate() {
            pending.push(PendingLine {
                text: if i == 0 {
                    format!("{SUBCAUSE_BULLET}{line}")
                } else {
                    line
                },
                indent: if i == 0 { 0.0 } else { sub_bullet },
                font_size: SUBCAUSE_FONT,
                kind: TextLineKind::SubCause,
            });
        }
        for root in &sub.root_causes {
            let wrapped = wrap_text_lines(
                root,
                &root_style,
                max_width - ROOT_CAUSE_INDENT - root_bullet,
                measurer,
            );
            for (i, line) in wrapped.into_iter().enumerate() {
                pending.push(PendingLine {
                    text: if i == 0 {
                        format!("{ROOT_CAUSE_BULLET}{line}")
                    } else {
                        line
                    },
                    indent: ROOT_CAUSE_INDENT + if i == 0 { 0.0 } else { root_bullet },
                    font_size: ROOT_CAUSE_FONT,
                    kind: TextLineKind::RootCause,
                });
            }
        }
    }

    let height_of = |line: &PendingLine| line_height(measurer, &TextStyle::sized(line.font_size));
    let ellipsis_height = line_height(measurer, &root_style);

    let total: f64 = pending.iter().map(height_of).sum();
    let mut truncated = false;
    if total > max_height {
        truncated = true;
        let mut used = 0.0;
        let mut keep = 0;
        for line in &pending {
            let h = height_of(line);
            if used + h + ellipsis_height > max_height {
                break;
            }
            used += h;
            keep += 1;
        }
        pending.truncate(keep);
        if ellipsis_height <= max_height {
            pending.push(PendingLine {
                text: ELLIPSIS.to_string(),
                indent: 0.0,
                font_size: ROOT_CAUSE_FONT,
                kind: TextLineKind::Ellipsis,
            });
        }
    }

    let height: f64 = pending.iter().map(height_of).sum();
    let top = match side {
        BoneSide::Top => spine_y - DETAIL_GAP_Y - height,
        BoneSide::Bottom => spine_y + DETAIL_GAP_Y,
    };

    let mut y = top;
    let mut lines = Vec::with_capacity(pending.len());
    for line in pending {
        let h = height_of(&line);
        lines.push(TextLineLayout {
            text: line.text,
            x: x + line.indent,
            y: y + h * BASELINE_RATIO,
            font_size: line.font_size,
            kind: line.kind,
        });
        y += h;
    }

    TextBlockLayout {
        x,
        y: top,
        width: max_width,
        height,
        lines,
        truncated,
    }
}
