// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! SVG rendering of a language ranking.
//!
//! The chart is a title followed by one row per ranked language: the label,
//! a bar proportional to the language's share and the share as a percentage
//! with one decimal. Output is a pure function of the ranking and the
//! [`ChartStyle`], so identical inputs produce byte-identical documents.

use std::{borrow::Cow, fmt::Write as _};

use crate::{config::ChartStyle, languages::Ranking};

/// Height of the placeholder rendered when there is nothing to rank.
pub const PLACEHOLDER_HEIGHT: u32 = 100;

/// Message shown by the placeholder.
pub const NO_DATA_MESSAGE: &str = "No language data available";

/// Offset from the row top to the text baseline beyond half the bar height.
const TEXT_BASELINE_OFFSET: u32 = 4;

/// Gap between the end of a bar and its percentage label.
const PERCENT_LABEL_GAP: f64 = 5.0;

/// Bar color used when a style carries no palette.
const FALLBACK_BAR_COLOR: &str = "#555555";

/// Renders `ranking` as an SVG document.
///
/// An empty ranking, or one whose byte counts sum to zero, renders the "no
/// data" placeholder.
///
/// Percentage labels come from [`percentages_in_tenths`], so they always add
/// up to exactly 100.0%. Because of that a label can differ by one tenth
/// from its share rounded on its own: three equal shares read 33.4%, 33.3%
/// and 33.3%, not 33.3% each.
///
/// # Examples
///
/// ```
/// use top_langs::{ChartStyle, LanguageTally, render_chart};
///
/// let mut tally = LanguageTally::new();
/// tally.add("Python", 1000,);
/// tally.add("JavaScript", 500,);
///
/// let svg = render_chart(&tally.top(8,), &ChartStyle::default(),);
/// assert!(svg.contains(">66.7%</text>"));
/// assert!(svg.contains(">33.3%</text>"));
/// ```
pub fn render_chart(ranking: &Ranking, style: &ChartStyle,) -> String
{
    let total = ranking.total_bytes();
    if total == 0 {
        return render_placeholder(style,);
    }

    let rows = u32::try_from(ranking.len(),).unwrap_or(u32::MAX,);
    let height = chart_height(style, rows,);
    let chart_width = f64::from(style.chart_width(),);
    let bar_x = style.label_width.saturating_add(style.padding,);
    let tenths = percentages_in_tenths(ranking,);
    let font = escape_xml(&style.font_family,);

    let mut buffer = String::with_capacity(512 + ranking.len() * 384,);
    open_document(&mut buffer, style, height,);
    let _ = writeln!(
        buffer,
        "  <text x=\"{x}\" y=\"{y}\" fill=\"{fill}\" font-family=\"{font}\" font-size=\"14\" font-weight=\"bold\">{title}</text>",
        x = style.padding,
        y = style.padding.saturating_add(14,),
        fill = escape_xml(&style.text_color),
        title = escape_xml(&style.title),
    );

    let mut y = style.padding.saturating_add(style.header_height,);
    for (rank, (share, share_tenths,),) in ranking.iter().zip(tenths,).enumerate() {
        let fraction = share.bytes as f64 / total as f64;
        let bar_width = fraction * chart_width;
        let color = rank
            .checked_rem(style.palette.len(),)
            .and_then(|index| style.palette.get(index,),)
            .map_or(FALLBACK_BAR_COLOR, String::as_str,);
        let baseline =
            y.saturating_add(style.bar_height / 2,).saturating_add(TEXT_BASELINE_OFFSET,);

        let _ = writeln!(
            buffer,
            "  <text x=\"{x}\" y=\"{baseline}\" fill=\"{fill}\" font-family=\"{font}\" font-size=\"12\">{name}</text>",
            x = style.padding,
            fill = escape_xml(&style.text_color),
            name = escape_xml(&share.name),
        );
        let _ = writeln!(
            buffer,
            "  <rect x=\"{bar_x}\" y=\"{y}\" width=\"{bar}\" height=\"{h}\" fill=\"{color}\" rx=\"3\"/>",
            bar = format_px(bar_width),
            h = style.bar_height,
            color = escape_xml(color),
        );
        let _ = writeln!(
            buffer,
            "  <text x=\"{x}\" y=\"{baseline}\" fill=\"{fill}\" font-family=\"{font}\" font-size=\"11\">{percent}%</text>",
            x = format_px(f64::from(bar_x) + bar_width + PERCENT_LABEL_GAP),
            fill = escape_xml(&style.text_color),
            percent = format_tenths(share_tenths),
        );

        y = y.saturating_add(style.bar_height.saturating_add(style.gap,),);
    }

    buffer.push_str("</svg>\n",);
    buffer
}

/// Renders the fixed-size "no data" image.
pub fn render_placeholder(style: &ChartStyle,) -> String
{
    let mut buffer = String::with_capacity(512,);
    open_document(&mut buffer, style, PLACEHOLDER_HEIGHT,);
    let _ = writeln!(
        buffer,
        "  <text x=\"{x}\" y=\"{y}\" text-anchor=\"middle\" fill=\"{fill}\" font-family=\"{font}\" font-size=\"14\">{NO_DATA_MESSAGE}</text>",
        x = style.width / 2,
        y = PLACEHOLDER_HEIGHT / 2,
        fill = escape_xml(&style.text_color),
        font = escape_xml(&style.font_family),
    );
    buffer.push_str("</svg>\n",);
    buffer
}

/// Image height for `rows` ranked languages.
///
/// Grows by one bar plus one gap per row; the gap after the last row is
/// replaced by the bottom padding. Saturates at `u32::MAX`.
pub fn chart_height(style: &ChartStyle, rows: u32,) -> u32
{
    let rows_height = rows
        .saturating_mul(style.bar_height.saturating_add(style.gap,),)
        .saturating_sub(style.gap,);
    style
        .padding
        .saturating_mul(2,)
        .saturating_add(style.header_height,)
        .saturating_add(rows_height,)
}

/// Shares of `ranking` in tenths of a percent, summing to exactly 1000.
///
/// Each share is floored and the tenths lost to flooring go, one each, to
/// the shares with the largest remainders. Equal remainders favor the
/// higher ranked share. Returns an empty vector when the total is zero.
pub fn percentages_in_tenths(ranking: &Ranking,) -> Vec<u64,>
{
    let total = ranking.total_bytes();
    if total == 0 {
        return Vec::new();
    }

    let mut tenths = Vec::with_capacity(ranking.len(),);
    let mut remainders = Vec::with_capacity(ranking.len(),);
    for share in ranking {
        let scaled = u128::from(share.bytes,) * 1000;
        tenths.push((scaled / total) as u64,);
        remainders.push(scaled % total,);
    }

    let assigned: u64 = tenths.iter().sum();
    let missing = 1000u64.saturating_sub(assigned,) as usize;

    let mut order: Vec<usize,> = (0..tenths.len()).collect();
    order.sort_by(|&left, &right| remainders[right].cmp(&remainders[left],),);
    for &position in order.iter().take(missing,) {
        tenths[position] += 1;
    }

    tenths
}

fn open_document(buffer: &mut String, style: &ChartStyle, height: u32,)
{
    let width = style.width;
    let _ = writeln!(
        buffer,
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    );
    let _ = writeln!(
        buffer,
        "  <rect width=\"{width}\" height=\"{height}\" fill=\"{}\"/>",
        escape_xml(&style.background),
    );
}

fn format_tenths(tenths: u64,) -> String
{
    format!("{}.{}", tenths / 10, tenths % 10)
}

/// Formats a pixel coordinate with at most two decimals and no trailing
/// zeros.
fn format_px(value: f64,) -> String
{
    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0',).trim_end_matches('.',);
    if trimmed == "-0" { "0".to_owned() } else { trimmed.to_owned() }
}

fn escape_xml(value: &str,) -> Cow<'_, str,>
{
    if value.chars().any(|character| matches!(character, '&' | '<' | '>' | '\"' | '\''),) {
        let mut escaped = String::with_capacity(value.len(),);
        for character in value.chars() {
            match character {
                '&' => escaped.push_str("&amp;",),
                '<' => escaped.push_str("&lt;",),
                '>' => escaped.push_str("&gt;",),
                '\"' => escaped.push_str("&quot;",),
                '\'' => escaped.push_str("&apos;",),
                other => escaped.push(other,),
            }
        }
        Cow::Owned(escaped,)
    } else {
        Cow::Borrowed(value,)
    }
}
