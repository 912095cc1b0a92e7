use anyhow::{Result, anyhow};
use tree_sitter::{Node, Parser};

use crate::model::MethodDeclaration;
use crate::util::has_extension;

use super::SourceParser;

const TYPE_DECLARATIONS: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
    "annotation_type_declaration",
];

/// tree-sitter backed Java method extractor
pub struct JavaParser {
    parser: Parser,
    extensions: Vec<String>,
}

impl JavaParser {
    pub fn new() -> Result<Self> {
        Self::with_extensions(&["java".to_string()])
    }

    pub fn with_extensions(extensions: &[String]) -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&java_language())
            .map_err(|_| anyhow!("failed to load java tree-sitter grammar"))?;
        Ok(Self {
            parser,
            extensions: extensions.to_vec(),
        })
    }
}

impl SourceParser for JavaParser {
    fn supports(&self, path: &str) -> bool {
        has_extension(path, &self.extensions)
    }

    fn parse(&mut self, path: &str, lines: &[String]) -> Result<Vec<MethodDeclaration>> {
        let source = lines.join("\n");
        let tree = self
            .parser
            .parse(&source, None)
            .ok_or_else(|| anyhow!("tree-sitter gave up on {}", path))?;

        let mut methods = Vec::new();
        let mut scopes = Scopes::default();
        visit(tree.root_node(), source.as_bytes(), &mut scopes, &mut methods);
        Ok(methods)
    }
}

fn java_language() -> tree_sitter::Language {
    tree_sitter_java::LANGUAGE.into()
}

/// Enclosing type names, with a running count of anonymous bodies per scope
#[derive(Default)]
struct Scopes {
    names: Vec<String>,
    anonymous: Vec<usize>,
    top_level_anonymous: usize,
}

impl Scopes {
    fn push(&mut self, name: String) {
        self.names.push(name);
        self.anonymous.push(0);
    }

    fn pop(&mut self) {
        self.names.pop();
        self.anonymous.pop();
    }

    /// `$anon<n>`, numbered in source order within the enclosing scope
    fn next_anonymous(&mut self) -> String {
        let counter = self
            .anonymous
            .last_mut()
            .unwrap_or(&mut self.top_level_anonymous);
        let name = format!("$anon{}", counter);
        *counter += 1;
        name
    }
}

fn visit(node: Node<'_>, source: &[u8], scopes: &mut Scopes, out: &mut Vec<MethodDeclaration>) {
    let kind = node.kind();

    let scope = if TYPE_DECLARATIONS.contains(&kind) {
        node.child_by_field_name("name")
            .map(|name| node_text(name, source))
    } else if kind == "class_body" && node.parent().is_some_and(|p| p.kind() == "object_creation_expression") {
        Some(scopes.next_anonymous())
    } else {
        None
    };

    if matches!(kind, "method_declaration" | "constructor_declaration") && !node.has_error() {
        if let Some(method) = declaration(node, source, &scopes.names) {
            out.push(method);
        }
    }

    let pushed = scope.is_some();
    if let Some(scope) = scope {
        scopes.push(scope);
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        visit(child, source, scopes, out);
    }

    if pushed {
        scopes.pop();
    }
}

fn declaration(node: Node<'_>, source: &[u8], nesting: &[String]) -> Option<MethodDeclaration> {
    let parameters = node.child_by_field_name("parameters")?;
    let text = source.get(node.start_byte()..parameters.end_byte())?;

    Some(MethodDeclaration {
        nesting: nesting.to_vec(),
        declaration: String::from_utf8_lossy(text).into_owned(),
        return_type: node
            .child_by_field_name("type")
            .map(|t| node_text(t, source)),
        start_line: node.start_position().row,
        end_line: node.end_position().row,
    })
}

fn node_text(node: Node<'_>, source: &[u8]) -> String {
    String::from_utf8_lossy(&source[node.byte_range()]).trim().to_owned()
}
