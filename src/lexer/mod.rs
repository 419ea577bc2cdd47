pub mod token;
pub use token::is_keyword;

use logos::Logos;
use crate::span::{Span, Spanned};
use crate::diagnostics::LintError;
use token::Token;

pub fn lex(source: &str) -> Result<Vec<Spanned<Token>>, LintError> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(tok) => {
                // Block comments spanning lines still separate statements
                if matches!(tok, Token::Comment) {
                    if source[span.clone()].contains('\n') {
                        tokens.push(Spanned::new(Token::Newline, Span::new(span.start, span.end)));
                    }
                    continue;
                }
                tokens.push(Spanned::new(tok, Span::new(span.start, span.end)));
            }
            Err(()) if source[span.clone()].starts_with("/*") => {
                return Err(LintError::syntax(
                    "unterminated block comment",
                    Span::new(span.start, span.start + 2),
                ));
            }
            Err(()) => {
                return Err(LintError::syntax(
                    format!("unexpected character '{}'", &source[span.start..span.end]),
                    Span::new(span.start, span.end),
                ));
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_call_statement() {
        let tokens = lex("getResult();").unwrap();
        assert_eq!(tokens.len(), 4);
        assert!(matches!(tokens[0].node, Token::Ident));
        assert!(matches!(tokens[1].node, Token::LParen));
        assert!(matches!(tokens[2].node, Token::RParen));
        assert!(matches!(tokens[3].node, Token::Semi));
    }

    #[test]
    fn lex_keywords_and_contextual_idents() {
        let tokens = lex("const x = await new Foo()\ndeclare type").unwrap();
        assert!(matches!(tokens[0].node, Token::Const));
        assert!(matches!(tokens[1].node, Token::Ident));
        assert!(matches!(tokens[2].node, Token::Eq));
        assert!(matches!(tokens[3].node, Token::Await));
        assert!(matches!(tokens[4].node, Token::New));
        assert!(matches!(tokens[8].node, Token::Newline));
        // `declare` and `type` are contextual
        assert!(matches!(tokens[9].node, Token::Ident));
        assert!(matches!(tokens[10].node, Token::Ident));
    }

    #[test]
    fn lex_operators() {
        let tokens = lex("=== !== == != => && || ?? ... .").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.node.clone()).collect();
        assert_eq!(kinds, vec![
            Token::EqEqEq, Token::BangEqEq, Token::EqEq, Token::BangEq, Token::FatArrow,
            Token::AmpAmp, Token::PipePipe, Token::QuestionQuestion, Token::Ellipsis, Token::Dot,
        ]);
    }

    #[test]
    fn lex_literals() {
        let tokens = lex(r#"42 3.5 "a\"b" 'c' `d`"#).unwrap();
        assert_eq!(tokens[0].node, Token::Number(42.0));
        assert_eq!(tokens[1].node, Token::Number(3.5));
        assert_eq!(tokens[2].node, Token::StringLit("a\"b".to_string()));
        assert_eq!(tokens[3].node, Token::StringLit("c".to_string()));
        assert_eq!(tokens[4].node, Token::StringLit("d".to_string()));
    }

    #[test]
    fn lex_comments_skipped() {
        let tokens = lex("a // trailing\nb /* inline */ c").unwrap();
        assert!(tokens.iter().all(|t| !matches!(t.node, Token::Comment)));
        assert_eq!(tokens.len(), 4); // a \n b c
    }

    #[test]
    fn lex_multiline_block_comment_is_newline() {
        let tokens = lex("a /* one\ntwo */ b").unwrap();
        assert!(matches!(tokens[1].node, Token::Newline));
    }

    #[test]
    fn lex_doc_comment_with_stars() {
        let tokens = lex("a /** doc\n * more */ b /* x * y */ c /***/ d").unwrap();
        let idents = tokens.iter().filter(|t| matches!(t.node, Token::Ident)).count();
        assert_eq!(idents, 4);
    }

    #[test]
    fn lex_unterminated_block_comment() {
        let err = lex("a /* never closed").unwrap_err();
        assert!(err.to_string().contains("unterminated block comment"), "{err}");
    }

    #[test]
    fn lex_optional_chaining() {
        let tokens = lex("a?.b ? c : d").unwrap();
        assert!(matches!(tokens[1].node, Token::QuestionDot));
        assert!(matches!(tokens[3].node, Token::Question));
    }

    #[test]
    fn lex_dollar_identifiers() {
        let tokens = lex("$x _y").unwrap();
        assert!(tokens.iter().all(|t| matches!(t.node, Token::Ident)));
    }

    #[test]
    fn lex_rejects_unknown_character() {
        let err = lex("a # b").unwrap_err();
        assert!(err.to_string().contains("unexpected character '#'"));
    }

    #[test]
    fn keywords_listed() {
        assert!(is_keyword("await"));
        assert!(!is_keyword("match"));
    }
}
