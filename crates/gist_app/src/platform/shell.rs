use gist_core::{GistId, ListSource};

pub const HELP: &str = "\
commands:
  public | mine | starred     open a list
  search QUERY                search gists on the server
  open ID                     show one gist
  page N | next | prev        change page
  filter [TERM]               filter the open list (empty clears)
  star ID                     star or unstar a gist
  fork ID                     fork a gist
  close                       close the current view
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    List(ListSource),
    Open(GistId),
    Page(u32),
    Next,
    Prev,
    Filter(String),
    Star(GistId),
    Fork(GistId),
    Close,
    Help,
    Quit,
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "public" => ShellCommand::List(ListSource::Public),
        "mine" => ShellCommand::List(ListSource::Mine),
        "starred" => ShellCommand::List(ListSource::Starred),
        "search" => ShellCommand::List(ListSource::Search(required(rest, "search QUERY")?)),
        "open" | "show" => ShellCommand::Open(required(rest, "open ID")?),
        "page" => {
            let page = rest
                .parse::<u32>()
                .ok()
                .filter(|page| *page > 0)
                .ok_or_else(|| format!("usage: page N (got {rest:?})"))?;
            ShellCommand::Page(page)
        }
        "next" => ShellCommand::Next,
        "prev" => ShellCommand::Prev,
        "filter" => ShellCommand::Filter(rest.to_string()),
        "star" => ShellCommand::Star(required(rest, "star ID")?),
        "fork" => ShellCommand::Fork(required(rest, "fork ID")?),
        "close" => ShellCommand::Close,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(format!("unknown command {other:?}, try `help`")),
    };
    Ok(Some(command))
}

fn required(rest: &str, usage: &str) -> Result<String, String> {
    if rest.is_empty() {
        Err(format!("usage: {usage}"))
    } else {
        Ok(rest.to_string())
    }
}
