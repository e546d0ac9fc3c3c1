use chrono::NaiveDate;
use factum::rules::date::resolve;
use factum::{Extractor, Fact, MatchValue, RunResult, Token};

/// What a piece of report text is, mapped to an SGR sequence when colour is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Title,
    Ruler,
    Token,
    Hit,
    Span,
    Label,
    Value,
    Timing,
    Resolved,
}

impl Style {
    fn sgr(self) -> &'static str {
        match self {
            Style::Title => "1;36",
            Style::Ruler => "90",
            Style::Token | Style::Value => "34",
            Style::Hit => "1;32",
            Style::Span => "33",
            Style::Label => "2",
            Style::Timing => "32",
            Style::Resolved => "36",
        }
    }
}

struct Painter {
    color: bool,
}

impl Painter {
    fn paint(&self, style: Style, text: impl AsRef<str>) -> String {
        let text = text.as_ref();
        if self.color { format!("\x1b[{}m{}\x1b[0m", style.sgr(), text) } else { text.to_string() }
    }

    fn ruler(&self, title: &str) -> String {
        self.paint(Style::Ruler, format!("━━━ {} ━━━", title))
    }
}

pub struct Report {
    pub color: bool,
    pub metrics: bool,
    pub today: NaiveDate,
}

impl Report {
    fn painter(&self) -> Painter {
        Painter { color: self.color }
    }

    pub fn print_input(&self, input: &str, tokens: &[Token]) {
        let p = self.painter();
        println!("\n{}", p.paint(Style::Title, format!("⚙  Extracting: \"{}\"", input.trim())));

        println!("\n{}", p.ruler("Tokens"));
        let line: Vec<String> = tokens
            .iter()
            .map(|t| {
                let tags: Vec<&str> = t.tags.iter().map(String::as_str).collect();
                format!("{}{}", p.paint(Style::Token, &t.text), p.paint(Style::Label, format!("/{}", tags.join(","))))
            })
            .collect();
        println!("  {}", line.join(" "));
    }

    pub fn print_run(&self, label: &str, extractor: &Extractor, tokens: &[Token], run: &RunResult) {
        let p = self.painter();
        println!("\n{}", p.ruler(label));

        if run.matches.is_empty() {
            println!("{}", p.paint(Style::Label, "  No matches"));
            println!("\n{}", p.paint(Style::Label, "  Tip: Set RUST_LOG=factum=trace to see transform rejections"));
        }

        for (idx, m) in run.matches.iter().enumerate() {
            println!(
                "  {} {} {} {}",
                p.paint(Style::Ruler, format!("[{}]", idx)),
                p.paint(Style::Hit, m.text(tokens)),
                p.paint(Style::Label, "│"),
                p.paint(Style::Span, format!("tokens {}..{}", m.span.start, m.span.end)),
            );
            match &m.value {
                MatchValue::Fact(fact) => self.print_fact(fact, &p),
                MatchValue::Text(text) => println!("      {} {}", p.paint(Style::Label, "text:"), text),
            }
        }

        if self.metrics {
            let info = extractor.info();
            let metrics = &run.metrics;
            println!(
                "\n  {} {} nodes, {} alternations, {} bindings",
                p.paint(Style::Label, "grammar:"),
                p.paint(Style::Value, info.nodes.to_string()),
                p.paint(Style::Value, info.alternations.to_string()),
                p.paint(Style::Value, info.bindings.to_string()),
            );
            println!(
                "  {} {}  │  positions: {}  │  visits: {}  │  backtracks: {}  │  rejections: {}  │  cuts: {}",
                p.paint(Style::Label, "run:"),
                p.paint(Style::Timing, format!("{:?}", metrics.total)),
                metrics.positions,
                metrics.node_visits,
                metrics.backtracks,
                metrics.transform_rejections,
                metrics.recursion_cuts,
            );
        }
    }

    fn print_fact(&self, fact: &Fact, p: &Painter) {
        println!("      {} {}", p.paint(Style::Label, "fact:"), p.paint(Style::Value, fact.to_string()));
        if fact.name() != "Date" {
            return;
        }
        if let Some(resolved) = resolve(fact, self.today) {
            let date = resolved.date.map(|d| d.to_string()).unwrap_or_else(|| "-".into());
            let time = resolved.time.map(|t| t.to_string()).unwrap_or_else(|| "-".into());
            println!(
                "      {} {} {}",
                p.paint(Style::Label, "resolved:"),
                p.paint(Style::Resolved, date),
                p.paint(Style::Resolved, time)
            );
        }
    }
}
