use super::*;
use crate::node::Node;
use ocl_tokenizer::{Found, LexicalError, Span};
use proptest::prelude::*;

fn parse(source: &str) -> Document<'_> {
    crate::parse(source)
}

/// Top-level nodes without the trailing end-of-input.
fn statements<'a, 'src>(doc: &'a Document<'src>) -> Vec<&'a Node<'src>> {
    let roots = doc.roots();
    let (last, rest) = roots.split_last().expect("document has no roots");
    assert!(matches!(doc.node(*last).kind, NodeKind::EndOfInput(_)));
    rest.iter().map(|id| doc.node(*id)).collect()
}

fn problem_kinds(node: &Node<'_>) -> Vec<ProblemKind> {
    node.problems.iter().map(|p| p.kind.clone()).collect()
}

fn value_of<'a, 'src>(doc: &'a Document<'src>, node: &Node<'src>) -> &'a Node<'src> {
    let attribute = node.as_attribute().expect("not an attribute");
    doc.node(attribute.value)
}

#[test]
fn test_empty_document() {
    let doc = parse("");
    assert_eq!(doc.roots().len(), 1);
    assert!(statements(&doc).is_empty());
    assert!(!doc.has_problems());

    let doc = parse("\n\n   \n");
    assert!(statements(&doc).is_empty());
}

#[test]
fn test_int_attribute() {
    let doc = parse("int_attribute = 1\n");
    let nodes = statements(&doc);
    assert_eq!(nodes.len(), 1);

    let attribute = nodes[0].as_attribute().unwrap();
    assert_eq!(attribute.name.text, "int_attribute");
    assert_eq!(attribute.assign.text, "=");

    let literal = value_of(&doc, nodes[0]).as_literal().unwrap();
    assert_eq!(literal.kind, LiteralKind::Integer);
    assert_eq!(literal.token.text, "1");
    assert!(!doc.has_problems());
}

#[test]
fn test_attribute_value_kinds() {
    let doc = parse(
        "s = \"hi\"\nd = 1.5\nh = <<EOF\nhello\nEOF\nih = <<-EOF\n  x\n  EOF\nt = true\nf = false\n",
    );
    let kinds: Vec<_> = statements(&doc)
        .into_iter()
        .map(|node| value_of(&doc, node).as_literal().unwrap().kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            LiteralKind::String,
            LiteralKind::Decimal,
            LiteralKind::Heredoc,
            LiteralKind::IndentedHeredoc,
            LiteralKind::True,
            LiteralKind::False,
        ]
    );
    assert!(!doc.has_problems());
}

#[test]
fn test_newline_before_assign() {
    let doc = parse("a\n= 1");
    let nodes = statements(&doc);
    assert_eq!(nodes.len(), 1);
    assert!(nodes[0].as_attribute().is_some());
    assert_eq!(problem_kinds(nodes[0]), vec![ProblemKind::NewlineBeforeAssign]);
    assert_eq!((nodes[0].problems[0].line, nodes[0].problems[0].column), (1, 2));

    let literal = value_of(&doc, nodes[0]).as_literal().unwrap();
    assert_eq!(literal.token.text, "1");
    assert!(value_of(&doc, nodes[0]).problems.is_empty());
}

#[test]
fn test_value_must_end_line() {
    let doc = parse("a = 1 b\n");
    let nodes = statements(&doc);
    let value = value_of(&doc, nodes[0]);
    assert_eq!(problem_kinds(value), vec![ProblemKind::ExpectedNewlineAfterValue]);
    assert_eq!((value.problems[0].line, value.problems[0].column), (1, 7));

    // The stray symbol is then reported on its own.
    assert_eq!(nodes.len(), 2);
    assert!(nodes[1].is_recovery());
    assert_eq!(problem_kinds(nodes[1]), vec![ProblemKind::ExpectedDefinition]);
}

#[test]
fn test_empty_block() {
    let doc = parse("empty_block {\n}\n");
    let nodes = statements(&doc);
    assert_eq!(nodes.len(), 1);

    let block = nodes[0].as_block().unwrap();
    assert_eq!(block.name.text, "empty_block");
    assert!(block.labels.is_empty());
    assert!(block.body.is_empty());
    assert_eq!(block.open.kind, TokenKind::OpenBrace);
    assert_eq!(block.close.kind, TokenKind::CloseBrace);
    assert!(!doc.has_problems());
}

#[test]
fn test_inline_empty_block() {
    let doc = parse("a {}");
    let nodes = statements(&doc);
    assert!(nodes[0].as_block().is_some());
    assert!(!doc.has_problems());
}

#[test]
fn test_newline_before_block() {
    let doc = parse("my_block\n{\n}");
    let nodes = statements(&doc);
    assert_eq!(nodes.len(), 1);
    assert!(nodes[0].as_block().is_some());
    assert_eq!(problem_kinds(nodes[0]), vec![ProblemKind::NewlineBeforeBlock]);
    assert_eq!((nodes[0].problems[0].line, nodes[0].problems[0].column), (1, 9));
}

#[test]
fn test_newline_before_labelled_block() {
    let doc = parse("my_block\n\"lbl\" {\n}\n");
    let nodes = statements(&doc);
    assert_eq!(nodes.len(), 1);

    let block = nodes[0].as_block().unwrap();
    assert_eq!(block.name.text, "my_block");
    let labels: Vec<_> = block.labels.iter().map(|t| t.text).collect();
    assert_eq!(labels, vec!["\"lbl\""]);
    assert_eq!(block.close.kind, TokenKind::CloseBrace);
    assert_eq!(problem_kinds(nodes[0]), vec![ProblemKind::NewlineBeforeBlock]);
}

#[test]
fn test_block_with_labels_and_children() {
    let source = "resource \"a\" \"b\" {\n  x = 1\n  inner {\n  }\n}\n";
    let doc = parse(source);
    let nodes = statements(&doc);
    assert_eq!(nodes.len(), 1);

    let block = nodes[0].as_block().unwrap();
    let labels: Vec<_> = block.labels.iter().map(|t| t.text).collect();
    assert_eq!(labels, vec!["\"a\"", "\"b\""]);
    assert_eq!(block.body.len(), 2);

    let root = doc.roots()[0];
    let x = block.body[0];
    let inner = block.body[1];
    assert_eq!(doc.node(x).as_attribute().unwrap().name.text, "x");
    assert_eq!(doc.node(inner).as_block().unwrap().name.text, "inner");
    assert_eq!(doc.parent(x), Some(root));
    assert_eq!(doc.parent(inner), Some(root));
    assert_eq!(doc.parent(root), None);

    let span = doc.span(root);
    assert_eq!(span.slice(source), source.trim_end());
    assert!(!doc.has_problems());
}

#[test]
fn test_symbol_pair_is_not_a_definition() {
    let doc = parse("my block {\n}");
    let nodes = statements(&doc);
    assert_eq!(nodes.len(), 2);

    assert!(nodes[0].is_recovery());
    assert_eq!(problem_kinds(nodes[0]), vec![ProblemKind::ExpectedDefinition]);
    assert_eq!((nodes[0].problems[0].line, nodes[0].problems[0].column), (1, 1));

    let block = nodes[1].as_block().unwrap();
    assert_eq!(block.name.text, "block");
    assert!(nodes[1].problems.is_empty());
}

#[test]
fn test_missing_open_brace() {
    let doc = parse("b \"label\"\n");
    let nodes = statements(&doc);
    let block = nodes[0].as_block().unwrap();
    assert_eq!(block.open.kind, TokenKind::Repair);
    assert_eq!(block.open.text, "{");
    assert_eq!(block.open.span, Span::empty(2));
    assert_eq!(
        problem_kinds(nodes[0]),
        vec![ProblemKind::MissingOpenBrace, ProblemKind::MissingCloseBrace]
    );
}

#[test]
fn test_missing_open_brace_reported_once() {
    let doc = parse("b \"x\" = 1\n");
    let nodes = statements(&doc);
    let block = nodes[0].as_block().unwrap();
    assert_eq!(block.open.kind, TokenKind::Repair);
    assert_eq!(
        problem_kinds(nodes[0]),
        vec![ProblemKind::MissingOpenBrace, ProblemKind::MissingCloseBrace]
    );
    assert_eq!(block.body.len(), 2);
    assert!(block.body.iter().all(|id| doc.node(*id).is_recovery()));
}

#[test]
fn test_missing_newline_after_open_brace() {
    let doc = parse("b { a = 1\n}\n");
    let nodes = statements(&doc);
    let block = nodes[0].as_block().unwrap();
    assert_eq!(problem_kinds(nodes[0]), vec![ProblemKind::MissingNewline]);
    assert_eq!((nodes[0].problems[0].line, nodes[0].problems[0].column), (1, 5));
    assert_eq!(block.body.len(), 1);
    assert_eq!(block.close.kind, TokenKind::CloseBrace);
}

#[test]
fn test_missing_close_brace() {
    let doc = parse("b {\n  a = 1\n");
    let nodes = statements(&doc);
    let block = nodes[0].as_block().unwrap();
    assert_eq!(block.body.len(), 1);
    assert_eq!(block.close.kind, TokenKind::Repair);
    assert_eq!(block.close.text, "}");
    assert_eq!(problem_kinds(nodes[0]), vec![ProblemKind::MissingCloseBrace]);
}

#[test]
fn test_array_with_commas() {
    let doc = parse("a = [1, 2, 3]\n");
    let nodes = statements(&doc);
    let value = value_of(&doc, nodes[0]);
    let array = value.as_array().unwrap();
    let texts: Vec<_> = array
        .entries
        .iter()
        .map(|id| doc.node(*id).as_literal().unwrap().token.text)
        .collect();
    assert_eq!(texts, vec!["1", "2", "3"]);
    assert_eq!(array.close.kind, TokenKind::CloseBracket);
    assert!(!doc.has_problems());
}

#[test]
fn test_array_across_lines() {
    let doc = parse("a = [\n  1,\n  2\n]\n");
    let nodes = statements(&doc);
    let array = value_of(&doc, nodes[0]).as_array().unwrap();
    assert_eq!(array.entries.len(), 2);
    assert!(!doc.has_problems());
}

#[test]
fn test_array_missing_separator() {
    let doc = parse("a = [1 2]\n");
    let nodes = statements(&doc);
    let value = value_of(&doc, nodes[0]);
    assert_eq!(value.as_array().unwrap().entries.len(), 2);
    assert_eq!(problem_kinds(value), vec![ProblemKind::MissingSeparator]);
    assert_eq!((value.problems[0].line, value.problems[0].column), (1, 8));
}

#[test]
fn test_unclosed_array_before_next_definition() {
    let doc = parse("a = [1,\nb = 2\n");
    let nodes = statements(&doc);
    assert_eq!(nodes.len(), 2);

    let value = value_of(&doc, nodes[0]);
    let array = value.as_array().unwrap();
    assert_eq!(array.entries.len(), 1);
    assert_eq!(array.close.kind, TokenKind::Repair);
    assert_eq!(problem_kinds(value), vec![ProblemKind::MissingCloseBracket]);

    let b = nodes[1].as_attribute().unwrap();
    assert_eq!(b.name.text, "b");
    assert!(nodes[1].problems.is_empty());
}

fn assert_array_closed_before_block(source: &str) {
    let doc = parse(source);
    let nodes = statements(&doc);
    assert_eq!(nodes.len(), 2, "{source:?}");

    let value = value_of(&doc, nodes[0]);
    let array = value.as_array().unwrap();
    assert_eq!(array.entries.len(), 1);
    assert_eq!(array.close.kind, TokenKind::Repair);
    assert_eq!(problem_kinds(value), vec![ProblemKind::MissingCloseBracket]);

    let block = nodes[1].as_block().unwrap();
    assert_eq!(block.name.text, "b");
    assert_eq!(block.close.kind, TokenKind::CloseBrace);
    assert!(nodes[1].problems.is_empty());
}

#[test]
fn test_unclosed_array_before_block() {
    assert_array_closed_before_block("a = [1,\nb {\n}\n");
}

#[test]
fn test_unclosed_array_before_labelled_block() {
    assert_array_closed_before_block("a = [1,\nb \"x\" \"y\" {\n}\n");

    let doc = parse("a = [1,\nb \"x\" \"y\" {\n}\n");
    let block = statements(&doc)[1].as_block().unwrap();
    assert_eq!(block.labels.len(), 2);
}

#[test]
fn test_unclosed_array_at_end_of_input() {
    let doc = parse("a = [1, 2");
    let nodes = statements(&doc);
    assert_eq!(nodes.len(), 1);

    let value = value_of(&doc, nodes[0]);
    assert_eq!(value.as_array().unwrap().entries.len(), 2);
    assert_eq!(problem_kinds(value), vec![ProblemKind::MissingCloseBracket]);
}

#[test]
fn test_array_of_dictionaries() {
    let doc = parse("a = [\n  {\n    b = 1\n  },\n]\n");
    let nodes = statements(&doc);
    let array = value_of(&doc, nodes[0]).as_array().unwrap();
    assert_eq!(array.entries.len(), 1);

    let dictionary = doc.node(array.entries[0]).as_dictionary().unwrap();
    assert_eq!(dictionary.entries.len(), 1);
    assert!(!doc.has_problems());
}

#[test]
fn test_array_symbol_element() {
    let doc = parse("a = [x]\n");
    let nodes = statements(&doc);
    let value = value_of(&doc, nodes[0]);
    assert!(value.problems.is_empty());

    let array = value.as_array().unwrap();
    assert_eq!(array.entries.len(), 1);
    let element = doc.node(array.entries[0]);
    assert!(element.is_recovery());
    assert_eq!(problem_kinds(element), vec![ProblemKind::ExpectedLiteral]);
}

#[test]
fn test_dictionary() {
    let doc = parse("d = {\n  a = 1\n  b = \"x\"\n}\n");
    let nodes = statements(&doc);
    let value = value_of(&doc, nodes[0]);
    let dictionary = value.as_dictionary().unwrap();
    let names: Vec<_> = dictionary
        .entries
        .iter()
        .map(|id| doc.node(*id).as_attribute().unwrap().name.text)
        .collect();
    assert_eq!(names, vec!["a", "b"]);
    assert!(!doc.has_problems());
}

#[test]
fn test_inline_empty_dictionary() {
    let doc = parse("d = {}\n");
    let nodes = statements(&doc);
    let dictionary = value_of(&doc, nodes[0]).as_dictionary().unwrap();
    assert!(dictionary.entries.is_empty());
    assert!(!doc.has_problems());
}

#[test]
fn test_dictionary_reports_skipped_content() {
    let doc = parse("d = {\n  1\n}\n");
    let nodes = statements(&doc);
    let value = value_of(&doc, nodes[0]);
    assert!(value.as_dictionary().unwrap().entries.is_empty());
    assert_eq!(problem_kinds(value), vec![ProblemKind::ExpectedDictionaryEntry]);
    assert_eq!((value.problems[0].line, value.problems[0].column), (2, 3));
}

#[test]
fn test_unclosed_dictionary() {
    let doc = parse("d = {\n  a = 1\n");
    let nodes = statements(&doc);
    let value = value_of(&doc, nodes[0]);
    let dictionary = value.as_dictionary().unwrap();
    assert_eq!(dictionary.entries.len(), 1);
    assert_eq!(dictionary.close.kind, TokenKind::Repair);
    assert_eq!(problem_kinds(value), vec![ProblemKind::MissingCloseBrace]);
}

#[test]
fn test_lexical_error_surfaces_on_literal() {
    let doc = parse("a = \"abc\n");
    let nodes = statements(&doc);
    let value = value_of(&doc, nodes[0]);
    assert_eq!(
        problem_kinds(value),
        vec![ProblemKind::Lexical(LexicalError::UnterminatedString {
            found: Found::Newline
        })]
    );
    assert!(value.problems[0].kind.is_lexical());
    assert_eq!(
        value.problems[0].to_string(),
        "expected closing quote; got newline at 1:5"
    );
}

#[test]
fn test_dangling_minus_in_array() {
    let doc = parse("a = [-x]\n");
    let nodes = statements(&doc);
    let value = value_of(&doc, nodes[0]);
    let array = value.as_array().unwrap();
    assert_eq!(array.entries.len(), 2);

    let minus = doc.node(array.entries[0]);
    assert_eq!(minus.as_literal().unwrap().token.text, "-");
    assert_eq!(
        problem_kinds(minus),
        vec![ProblemKind::Lexical(LexicalError::ExpectedDigit {
            found: Found::Char('x')
        })]
    );
    assert_eq!(problem_kinds(value), vec![ProblemKind::MissingSeparator]);
    assert!(doc.node(array.entries[1]).is_recovery());
}

#[test]
fn test_indented_value_after_newline() {
    let doc = parse("int_attribute\n    = 1");
    let nodes = statements(&doc);
    assert_eq!(problem_kinds(nodes[0]), vec![ProblemKind::NewlineBeforeAssign]);

    let literal = value_of(&doc, nodes[0]).as_literal().unwrap();
    assert_eq!((literal.token.line, literal.token.column), (2, 7));
}

#[test]
fn test_statement_without_name() {
    let doc = parse("= 1");
    let nodes = statements(&doc);
    assert_eq!(nodes.len(), 2);
    for node in nodes {
        assert!(node.is_recovery());
        assert_eq!(problem_kinds(node), vec![ProblemKind::ExpectedName]);
    }
}

#[test]
fn test_bad_value() {
    let doc = parse("a = =\n");
    let nodes = statements(&doc);
    assert_eq!(nodes.len(), 1);
    let value = value_of(&doc, nodes[0]);
    assert!(value.is_recovery());
    assert_eq!(problem_kinds(value), vec![ProblemKind::ExpectedValue]);
}

#[test]
fn test_missing_value_keeps_closing_brace() {
    let doc = parse("b {\n  a = }\n");
    let nodes = statements(&doc);
    assert_eq!(nodes.len(), 1);

    let block = nodes[0].as_block().unwrap();
    assert_eq!(block.close.kind, TokenKind::CloseBrace);
    assert!(nodes[0].problems.is_empty());

    let value = value_of(&doc, doc.node(block.body[0]));
    assert_eq!(problem_kinds(value), vec![ProblemKind::ExpectedValue]);
}

#[test]
fn test_missing_value_before_stray_brace() {
    let doc = parse("a = }\n");
    let nodes = statements(&doc);
    assert_eq!(nodes.len(), 1);

    let value = value_of(&doc, nodes[0]);
    assert!(value.is_recovery());
    assert_eq!(problem_kinds(value), vec![ProblemKind::ExpectedValue]);
    assert_eq!(doc.problems().count(), 1);
}

#[test]
fn test_missing_value_keeps_dictionary_brace() {
    let doc = parse("d = {\n  a = }\n");
    let nodes = statements(&doc);
    let dictionary = value_of(&doc, nodes[0]).as_dictionary().unwrap();
    assert_eq!(dictionary.close.kind, TokenKind::CloseBrace);
    assert_eq!(doc.problems().count(), 1);
}

#[test]
fn test_trailing_newlines_end_block_body() {
    let doc = parse("b {\n  a = 1\n\n\n");
    let nodes = statements(&doc);
    let block = nodes[0].as_block().unwrap();
    assert_eq!(block.body.len(), 1);
    assert_eq!(problem_kinds(nodes[0]), vec![ProblemKind::MissingCloseBrace]);
    assert_eq!(doc.roots().len(), 2);
}

#[test]
fn test_from_tokens_appends_end_of_input() {
    let tokens = vec![
        Token::new(TokenKind::Symbol, "a", Span::new(0, 1), 1, 1),
        Token::new(TokenKind::Assign, "=", Span::new(2, 3), 1, 3),
        Token::new(TokenKind::Integer, "1", Span::new(4, 5), 1, 5),
    ];
    let doc = Parser::from_tokens(tokens).parse();
    assert_eq!(doc.tokens().len(), 4);
    assert_eq!(doc.tokens()[3].kind, TokenKind::Eof);
    assert_eq!(doc.tokens()[3].span, Span::empty(5));
    assert_eq!(statements(&doc).len(), 1);

    let doc = Parser::from_tokens(Vec::new()).parse();
    assert_eq!(doc.roots().len(), 1);
}

#[test]
fn test_problems_in_source_order() {
    let doc = parse("= 1\nd = {\n  2\n}\n");
    let messages: Vec<_> = doc.problems().map(|(_, p)| p.to_string()).collect();
    assert_eq!(
        messages,
        vec![
            "expected assignment name or block name at 1:1",
            "expected assignment name or block name at 1:3",
            "expected attribute in dictionary at 3:3",
        ]
    );
}

proptest! {
    #[test]
    fn parse_never_panics_and_is_well_formed(source in "[a-z0-9 =\\[\\]{},\"<.\n-]{0,64}") {
        let doc = parse(&source);

        let last = *doc.roots().last().unwrap();
        prop_assert!(matches!(doc.node(last).kind, NodeKind::EndOfInput(_)));

        for root in doc.roots() {
            prop_assert_eq!(doc.parent(*root), None);
        }
        for id in doc.walk() {
            for child in doc.children(id) {
                prop_assert_eq!(doc.parent(*child), Some(id));
            }
        }
        prop_assert_eq!(doc.walk().count(), doc.len());
    }
}
