//! Boxed table rendering for list output.

/// Renders `headers` and `rows` as a box-drawn grid.
///
/// Short rows are padded with empty cells; extra cells are dropped.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    out.push_str(&rule(&widths, '╒', '╤', '╕', '═'));
    out.push_str(&line(&widths, headers.iter().copied()));
    out.push_str(&rule(&widths, '╞', '╪', '╡', '═'));
    for (position, row) in rows.iter().enumerate() {
        out.push_str(&line(
            &widths,
            (0..widths.len()).map(|index| row.get(index).map_or("", String::as_str)),
        ));
        if position + 1 < rows.len() {
            out.push_str(&rule(&widths, '├', '┼', '┤', '─'));
        }
    }
    out.push_str(&rule(&widths, '╘', '╧', '╛', '═'));
    out
}

fn rule(widths: &[usize], left: char, joint: char, right: char, fill: char) -> String {
    let segments: Vec<String> = widths
        .iter()
        .map(|width| fill.to_string().repeat(width + 2))
        .collect();
    format!("{left}{}{right}\n", segments.join(&joint.to_string()))
}

fn line<'a>(widths: &[usize], cells: impl Iterator<Item = &'a str>) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!(" {cell}{} ", " ".repeat(pad))
        })
        .collect();
    format!("│{}│\n", padded.join("│"))
}

#[cfg(test)]
mod tests {
    use super::render_table;

    #[test]
    fn columns_align_to_widest_cell() {
        let rendered = render_table(
            &["Username", "Email"],
            &[vec!["admin".to_string(), "admin123@gmail.com".to_string()]],
        );
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[1].contains("Username"));
        assert!(lines[3].contains("admin123@gmail.com"));
        let width = lines[0].chars().count();
        assert!(lines.iter().all(|line| line.chars().count() == width));
    }

    #[test]
    fn empty_rows_render_header_only() {
        let rendered = render_table(&["School ID"], &[]);
        assert_eq!(rendered.lines().count(), 4);
    }
}
