use std::collections::BTreeMap;
use std::path::PathBuf;

use doccreft_core::{Msg, ToolMode};

pub const HELP: &str = "\
Commands (file and download numbers start at 1):
  mode convert|compress        switch tool (clears the file list)
  add <path>...                upload files
  remove <n>                   drop file n from the list
  clear                        drop all files
  quality <1-100>              compression quality
  name [text]                  output base name (empty resets to the default)
  convert                      generate/process PDF from the list
  merge                        merge the list into one PDF
  compress                     compress every file as JPEG
  rotate <n> <page>:<angle>... rotate pages of PDF n (pages start at 0)
  delete-pages <n> <page>...   delete pages of PDF n
  save [n]                     save download n, or all downloads
  dismiss                      close the current notice
  counter                      refresh the usage counter
  wait                         hold further input until pending work is done
  show                         redraw the screen
  help                         this text
  quit                         leave";

/// A line typed into the shell, decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Dispatch(Msg),
    Wait,
    Show,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    let msg = match word.to_ascii_lowercase().as_str() {
        "" => return Ok(None),
        "help" | "?" => return Ok(Some(ShellCommand::Help)),
        "show" => return Ok(Some(ShellCommand::Show)),
        "wait" => return Ok(Some(ShellCommand::Wait)),
        "quit" | "exit" => return Ok(Some(ShellCommand::Quit)),
        "mode" => match args.as_slice() {
            ["convert" | "pdf"] => Msg::ModeSelected(ToolMode::Convert),
            ["compress" | "compressor"] => Msg::ModeSelected(ToolMode::Compress),
            _ => return Err("usage: mode convert|compress".to_string()),
        },
        "add" => {
            if args.is_empty() {
                return Err("usage: add <path>...".to_string());
            }
            Msg::FilesSelected(args.iter().map(PathBuf::from).collect())
        }
        "remove" => match args.as_slice() {
            [n] => Msg::RemoveClicked(parse_position(n)?),
            _ => return Err("usage: remove <n>".to_string()),
        },
        "clear" => Msg::ClearAllClicked,
        "quality" => match args.as_slice() {
            [value] => Msg::QualityChanged(parse_quality(value)?),
            _ => return Err("usage: quality <1-100>".to_string()),
        },
        "name" => Msg::OutputNameChanged(rest.to_string()),
        "convert" => Msg::ConvertClicked,
        "merge" => Msg::MergeClicked,
        "compress" => Msg::BatchCompressClicked,
        "rotate" => match args.split_first() {
            Some((n, specs)) if !specs.is_empty() => Msg::RotateRequested {
                index: parse_position(n)?,
                rotations: parse_rotations(specs)?,
            },
            _ => return Err("usage: rotate <n> <page>:<angle>...".to_string()),
        },
        "delete-pages" => match args.split_first() {
            Some((n, pages)) if !pages.is_empty() => Msg::DeletePagesRequested {
                index: parse_position(n)?,
                pages: parse_pages(pages)?,
            },
            _ => return Err("usage: delete-pages <n> <page>...".to_string()),
        },
        "save" => match args.as_slice() {
            [] => Msg::SaveRequested(None),
            [n] => Msg::SaveRequested(Some(parse_position(n)?)),
            _ => return Err("usage: save [n]".to_string()),
        },
        "dismiss" | "ok" => Msg::NoticeDismissed,
        "counter" => Msg::CounterTick,
        other => return Err(format!("unknown command `{other}` (try `help`)")),
    };
    Ok(Some(ShellCommand::Dispatch(msg)))
}

/// Turns a 1-based position into a 0-based index.
fn parse_position(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("`{raw}` is not a position (1, 2, ...)")),
    }
}

fn parse_quality(raw: &str) -> Result<u8, String> {
    raw.parse::<u8>()
        .ok()
        .filter(|q| (1..=100).contains(q))
        .ok_or_else(|| format!("quality must be 1-100, got `{raw}`"))
}

fn parse_rotations(specs: &[&str]) -> Result<BTreeMap<u32, i32>, String> {
    specs
        .iter()
        .flat_map(|spec| spec.split(','))
        .filter(|spec| !spec.is_empty())
        .map(|spec| {
            let (page, angle) = spec
                .split_once(':')
                .ok_or_else(|| format!("`{spec}` is not <page>:<angle>"))?;
            let page = page
                .parse::<u32>()
                .map_err(|_| format!("bad page `{page}`"))?;
            let angle = angle
                .parse::<i32>()
                .ok()
                .filter(|a| a % 90 == 0)
                .ok_or_else(|| format!("angle must be a multiple of 90, got `{angle}`"))?;
            Ok::<_, String>((page, angle))
        })
        .collect()
}

fn parse_pages(raw: &[&str]) -> Result<Vec<u32>, String> {
    raw.iter()
        .flat_map(|chunk| chunk.split(','))
        .filter(|page| !page.is_empty())
        .map(|page| page.parse::<u32>().map_err(|_| format!("bad page `{page}`")))
        .collect()
}
