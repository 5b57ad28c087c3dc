//! # Header Emitter
//!
//! Renders [`ResourceDeclaration`]s as a C++ header:
//!
//! ```text
//! #ifndef RESOURCES_H
//! #define RESOURCES_H
//!
//! #include <string>
//! #include <vector>
//!
//! namespace Resources {
//!     const std::vector<std::string> HELLO_TXT_CHUNKS = {
//!         "SGk="
//!     };
//!     const std::string HELLO_TXT_PATH = "hello.txt";
//! }
//!
//! #endif // RESOURCES_H
//! ```

use crate::config::GeneratorConfig;

/// One input file, ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDeclaration {
    pub ident: String,
    /// Forward-slash path relative to the input directory.
    pub path: String,
    pub chunks: Vec<String>,
    pub byte_len: usize,
    pub encoded_len: usize,
}

impl ResourceDeclaration {
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }
}

/// Renders the complete header text.
pub fn render_header(config: &GeneratorConfig, decls: &[ResourceDeclaration]) -> String {
    let guard = config.include_guard();
    let mut out = format!(
        "#ifndef {guard}\n#define {guard}\n\n#include <string>\n#include <vector>\n\nnamespace {} {{\n",
        config.namespace
    );

    for decl in decls {
        render_declaration(&mut out, decl);
    }

    out.push_str(&format!("}}\n\n#endif // {guard}\n"));
    out
}

fn render_declaration(out: &mut String, decl: &ResourceDeclaration) {
    out.push_str(&format!("    const std::vector<std::string> {}_CHUNKS = {{\n", decl.ident));
    for (i, chunk) in decl.chunks.iter().enumerate() {
        let sep = if i + 1 < decl.chunks.len() { "," } else { "" };
        out.push_str(&format!("        \"{}\"{}\n", escape_literal(chunk), sep));
    }
    out.push_str("    };\n");
    out.push_str(&format!(
        "    const std::string {}_PATH = \"{}\";\n",
        decl.ident,
        escape_literal(&decl.path)
    ));
}

/// Escapes `s` for use inside a C++ narrow string literal.
///
/// Control characters use fixed-width octal escapes so a following digit is
/// never swallowed into the escape.
pub fn escape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '?' => out.push_str("\\?"),
            c if c.is_ascii_control() => out.push_str(&format!("\\{:03o}", c as u32)),
            c => out.push(c),
        }
    }
    out
}
