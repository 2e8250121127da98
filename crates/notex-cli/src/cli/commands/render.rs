//! Renders a notes file to stdout as plain text.

use std::path::Path;

use anyhow::{Context, Result};

use notex_core::content::{self, FlowRun, RenderNode, ViewMode};

pub fn run(file: &Path, raw: bool) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("read {}", file.display()))?;
    let segments = content::segment(&text);
    let mode = if raw {
        ViewMode::Raw
    } else {
        ViewMode::Structured
    };

    for (index, node) in content::render(&segments, mode).iter().enumerate() {
        if index > 0 {
            println!();
        }
        match node {
            RenderNode::Source(source) => println!("{source}"),
            RenderNode::Flow(runs) => println!("{}", flow_text(runs)),
            RenderNode::MathBlock(math) => println!("  {}", math.trim()),
            RenderNode::MathBlockError { source, reason } => {
                println!("⚠ {} ({reason})", source.trim());
            }
        }
    }
    Ok(())
}

fn flow_text(runs: &[FlowRun]) -> String {
    let mut out = String::new();
    for run in runs {
        match run {
            FlowRun::Plain(text)
            | FlowRun::Bold(text)
            | FlowRun::Italic(text)
            | FlowRun::Math(text) => out.push_str(text),
            FlowRun::MathError { source, reason } => {
                out.push_str(&format!("⚠ {source} ({reason})"));
            }
            FlowRun::Break => out.push('\n'),
        }
    }
    out
}
