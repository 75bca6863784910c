//! Render sections back to markdown.

use crate::section::Section;

pub fn reconstruct(sections: &[Section]) -> String {
    let mut lines: Vec<String> = Vec::new();
    for section in sections {
        lines.push(format!("{} {}", "#".repeat(section.level), section.title));
        lines.push(String::new());
        lines.extend(section.content().iter().cloned());
        lines.push(String::new());
    }
    lines.join("\n")
}
