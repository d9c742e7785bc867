use doccreft_core::{AppViewModel, Notice, PreviewItem, PreviewKind, ToolMode};
use doccreft_engine::ClientSettings;

/// Draws the view model as plain text lines.
pub fn render(view: &AppViewModel, settings: &ClientSettings) -> Vec<String> {
    let mode_label = match view.mode {
        ToolMode::Convert => "PDF tools",
        ToolMode::Compress => "Image compressor",
    };
    let uses = view
        .usage_count
        .map(format_with_commas)
        .unwrap_or_else(|| "-".to_string());

    let mut lines = vec![format!("== DocCreft | {mode_label} | files processed: {uses} ==")];

    if view.workspace_visible {
        lines.push(format!("Files ({}):", view.previews.len()));
        lines.extend(view.previews.iter().map(|item| format_preview(item, settings)));
    } else {
        lines.push("No files yet. Use `add <path>...` to upload.".to_string());
    }

    let output_name = if view.output_name.is_empty() {
        "(default)"
    } else {
        view.output_name.as_str()
    };
    if view.convert_panel_visible {
        let mut actions = format!("Actions: [convert] {}", view.process_label.text());
        if view.merge_visible {
            actions.push_str(" | [merge] Merge PDFs");
        }
        lines.push(actions);
        lines.push(format!("Output name: {output_name}"));
    }
    if view.compress_panel_visible {
        lines.push("Actions: [compress] Compress all".to_string());
        lines.push(format!(
            "Quality: {} | Output name: {output_name}",
            view.quality
        ));
    }

    if let Some(primary) = &view.primary_download {
        lines.push(format!("Result: {}", primary.name));
    }
    if !view.downloads.is_empty() {
        lines.push("Downloads:".to_string());
        for (i, item) in view.downloads.iter().enumerate() {
            let url = settings
                .download_url(&item.server_filename)
                .map(|url| url.to_string())
                .unwrap_or_else(|_| item.server_filename.clone());
            lines.push(format!("  [{}] {}  {}", i + 1, item.name, url));
        }
    }

    if view.loading {
        match view.batch_progress {
            Some(progress) => lines.push(format!(
                "Working... compressing {} of {}",
                (progress.done + 1).min(progress.total),
                progress.total
            )),
            None => lines.push("Working...".to_string()),
        }
    }

    match &view.notice {
        Some(Notice::Success) => {
            lines.push("Success! Your files are ready. (`save` to download, `dismiss` to close)".to_string())
        }
        Some(Notice::Alert(message)) => lines.push(format!("! {message} (`dismiss` to close)")),
        None => {}
    }

    lines
}

fn format_preview(item: &PreviewItem, settings: &ClientSettings) -> String {
    let preview = match item.kind {
        PreviewKind::PdfIcon => "[PDF]".to_string(),
        PreviewKind::Thumbnail => settings
            .download_url(&item.server_name)
            .map(|url| format!("thumbnail {url}"))
            .unwrap_or_else(|_| "[image]".to_string()),
    };
    format!("  [{}] {}  {}", item.index + 1, item.original_name, preview)
}

fn format_with_commas(value: u64) -> String {
    let mut out = String::new();
    for (i, ch) in value.to_string().chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use doccreft_core::{BatchProgress, DownloadItem, ProcessLabel};

    fn preview(index: usize, name: &str, kind: PreviewKind) -> PreviewItem {
        PreviewItem {
            index,
            original_name: name.to_string(),
            server_name: format!("u_{name}"),
            kind,
        }
    }

    #[test]
    fn empty_convert_view() {
        let view = AppViewModel {
            convert_panel_visible: true,
            quality: 60,
            ..AppViewModel::default()
        };
        let lines = render(&view, &ClientSettings::default());

        assert_eq!(lines[0], "== DocCreft | PDF tools | files processed: - ==");
        assert!(lines.iter().any(|l| l.starts_with("No files yet")));
        assert!(lines.contains(&"Actions: [convert] Generate PDF".to_string()));
    }

    #[test]
    fn previews_distinguish_pdfs_from_images() {
        let view = AppViewModel {
            workspace_visible: true,
            convert_panel_visible: true,
            merge_visible: true,
            process_label: ProcessLabel::ProcessPdf,
            previews: vec![
                preview(0, "scan.png", PreviewKind::Thumbnail),
                preview(1, "notes.pdf", PreviewKind::PdfIcon),
            ],
            usage_count: Some(1234567),
            ..AppViewModel::default()
        };
        let lines = render(&view, &ClientSettings::default());

        assert!(lines[0].contains("1,234,567"));
        assert!(lines.contains(
            &"  [1] scan.png  thumbnail http://localhost:5001/api/download/u_scan.png".to_string()
        ));
        assert!(lines.contains(&"  [2] notes.pdf  [PDF]".to_string()));
        assert!(lines.contains(&"Actions: [convert] Process PDF | [merge] Merge PDFs".to_string()));
    }

    #[test]
    fn compress_view_shows_progress_and_downloads() {
        let view = AppViewModel {
            mode: ToolMode::Compress,
            compress_panel_visible: true,
            quality: 40,
            output_name: "trip".to_string(),
            loading: true,
            batch_progress: Some(BatchProgress { done: 1, total: 3 }),
            downloads: vec![DownloadItem {
                name: "trip_1.jpg".to_string(),
                server_filename: "compressed_a.jpg".to_string(),
            }],
            ..AppViewModel::default()
        };
        let lines = render(&view, &ClientSettings::default());

        assert!(lines.contains(&"Quality: 40 | Output name: trip".to_string()));
        assert!(lines.contains(
            &"  [1] trip_1.jpg  http://localhost:5001/api/download/compressed_a.jpg".to_string()
        ));
        assert!(lines.contains(&"Working... compressing 2 of 3".to_string()));
        assert!(!lines.iter().any(|l| l.contains("[convert]")));
    }

    #[test]
    fn alert_is_shown() {
        let view = AppViewModel {
            notice: Some(Notice::Alert("Error uploading files.".to_string())),
            ..AppViewModel::default()
        };
        let lines = render(&view, &ClientSettings::default());
        assert_eq!(
            lines.last().unwrap(),
            "! Error uploading files. (`dismiss` to close)"
        );
    }

    #[test]
    fn commas_group_thousands() {
        assert_eq!(format_with_commas(0), "0");
        assert_eq!(format_with_commas(999), "999");
        assert_eq!(format_with_commas(1000), "1,000");
    }
}
