use crate::checker::subtoken::Subtoken;
use colored::*;
use std::path::Path;

/// Batch-mode line for one unmatched token.
pub fn format_report_line(file: &Path, line: usize, token: &str, unmatched: &[Subtoken]) -> String {
    if let [single] = unmatched {
        return format!(
            "{}:{}: '{}' not found in dictionary (from token '{}')",
            file.display(),
            line,
            single.text,
            token
        );
    }
    let quoted = unmatched
        .iter()
        .map(|st| format!("'{}'", st.text))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{}:{}: {} were not found in the dictionary (from token '{}')",
        file.display(),
        line,
        quoted,
        token
    )
}

/// Interactive-mode header for one unmatched token.
pub fn format_unmatched(
    file: &Path,
    line: usize,
    token: &str,
    unmatched: &[Subtoken],
    colored_output: bool,
) -> String {
    let subtokens = unmatched
        .iter()
        .map(|st| st.text.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    if colored_output {
        format!(
            "{}: Unmatched '{}' -> {{{}}}",
            format!("{}:{}", file.display(), line).blue().bold(),
            token.red().bold(),
            subtokens.yellow()
        )
    } else {
        format!(
            "{}:{}: Unmatched '{}' -> {{{}}}",
            file.display(),
            line,
            token,
            subtokens
        )
    }
}

pub fn token_prompt() -> &'static str {
    "   (i)gnore, (I)gnore all, (r)eplace, (R)eplace all, (a)dd to dictionary, or\n   show (c)ontext? [i]"
}

/// Prompt for one subtoken in the add-to-dictionary menu.
pub fn add_prompt(subtoken: &str, offer_p: bool, offer_f: bool, offer_new: bool) -> String {
    let mut prompt = format!(
        "      Subtoken '{}':\n         (b)ack, (i)gnore, add to (n)atural language dictionary",
        subtoken
    );
    if offer_p {
        prompt.push_str(", add to\n         (p)rogramming language dictionary");
    }
    if offer_f {
        prompt.push_str(", add to\n         (f)ile-specific dictionary");
    }
    if offer_new {
        prompt.push_str(", add to\n         (N)ew file-specific dictionary");
    }
    prompt.push_str(" [i]");
    prompt
}

/// Numbered language menu shown when an extension has no language yet.
pub fn language_menu(ext: &str, languages: &[&str]) -> Vec<String> {
    let mut lines = vec![format!(
        "            Extension \"{}\" is not registered.  With which programming language\n            should \"{}\" be associated?",
        ext, ext
    )];
    for (i, lang) in languages.iter().enumerate() {
        lines.push(format!("               {:3}: {}", i, lang));
    }
    lines.push(format!(
        "               {:3}: (Create new language file-type)",
        languages.len()
    ));
    lines
}

/// `lines` are `(line_number, text)` pairs; line endings are stripped.
pub fn format_context<'a>(lines: impl IntoIterator<Item = (usize, &'a str)>) -> Vec<String> {
    lines
        .into_iter()
        .map(|(num, text)| format!("{:4}: {}", num, text.trim_end_matches(['\n', '\r'])))
        .collect()
}

pub fn cancelled() -> &'static str {
    "      (Canceled.)\n"
}

pub fn format_file_error(file: &Path, reason: &dyn std::fmt::Display) -> String {
    format!(
        "Error: can't read source file '{}'; skipping (reason: {})",
        file.display(),
        reason
    )
}

pub fn print_fix_summary(total_fixed: usize, files_changed: usize, colored: bool) {
    if total_fixed == 0 {
        if colored {
            println!("{}", "No corrections applied.".green().bold());
        } else {
            println!("No corrections applied.");
        }
        return;
    }
    let fix_word = if total_fixed == 1 { "correction" } else { "corrections" };
    let file_word = if files_changed == 1 { "file" } else { "files" };
    if colored {
        println!(
            "{} {} {} applied to {} {}",
            "✓".green().bold(),
            total_fixed.to_string().green().bold(),
            fix_word,
            files_changed,
            file_word
        );
    } else {
        println!(
            "✓ {} {} applied to {} {}",
            total_fixed, fix_word, files_changed, file_word
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::subtoken::split;

    #[test]
    fn test_report_line_single() {
        let subs = split("blabbb");
        assert_eq!(
            format_report_line(Path::new("path"), 1, "blabbb", &subs),
            "path:1: 'blabbb' not found in dictionary (from token 'blabbb')"
        );
    }

    #[test]
    fn test_report_line_multiple() {
        let subs: Vec<_> = split("someMispeldVaraible").into_iter().skip(1).collect();
        assert_eq!(
            format_report_line(Path::new("a.c"), 3, "someMispeldVaraible", &subs),
            "a.c:3: 'mispeld', 'varaible' were not found in the dictionary (from token 'someMispeldVaraible')"
        );
    }

    #[test]
    fn test_unmatched_plain() {
        let subs: Vec<_> = split("someMispeldVaraible").into_iter().skip(1).collect();
        assert_eq!(
            format_unmatched(Path::new("a.c"), 3, "someMispeldVaraible", &subs, false),
            "a.c:3: Unmatched 'someMispeldVaraible' -> {mispeld, varaible}"
        );
    }

    #[test]
    fn test_add_prompt_offers() {
        let prompt = add_prompt("frob", true, false, true);
        assert!(prompt.contains("(p)rogramming"));
        assert!(!prompt.contains("(f)ile-specific"));
        assert!(prompt.contains("(N)ew"));
    }

    #[test]
    fn test_context_format() {
        let lines = format_context(vec![(9, "foo\r\n"), (10, "bar")]);
        assert_eq!(lines, vec!["   9: foo", "  10: bar"]);
    }
}
