//! Lexical analyzer

use std::iter::Peekable;
use std::str::CharIndices;

use crate::diag::{Location, ParseError, Position, SyntaxError};
use crate::token::{self, Literal, Token, TokenKind};

/// Turn source text into a sequence of tokens.
///
/// Unscannable input yields an error for the offending character only: the scanner keeps going
/// so that a single pass reports as many problems as possible.  The last item produced is always
/// a `TokenKind::Eof` token.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    // Byte offset of the first character of the token being scanned.
    start: usize,
    line: Position,
    done: bool,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner operating on `source`.
    pub fn new(source: &'a str) -> Scanner<'a> {
        Scanner {
            source,
            chars: source.char_indices().peekable(),
            start: 0,
            line: 1,
            done: false,
        }
    }

    /// Scan next token and return it.
    pub fn get_token(&mut self) -> Result<Token, SyntaxError> {
        loop {
            self.start = self.offset();
            let ch = match self.advance() {
                None => return Ok(Token::new(TokenKind::Eof, "", None, self.line)),
                Some(ch) => ch,
            };
            let kind = match ch {
                '\n' => {
                    self.line += 1;
                    continue;
                }
                ' ' | '\t' | '\r' => continue,
                '(' => TokenKind::LeftParen,
                ')' => TokenKind::RightParen,
                '{' => TokenKind::LeftBrace,
                '}' => TokenKind::RightBrace,
                ',' => TokenKind::Comma,
                '.' => TokenKind::Dot,
                '-' => TokenKind::Minus,
                '+' => TokenKind::Plus,
                ';' => TokenKind::Semicolon,
                '*' => TokenKind::Star,
                '/' => {
                    if self.matches('/') {
                        self.skip_comment();
                        continue;
                    }
                    TokenKind::Slash
                }
                '!' => self.either('=', TokenKind::BangEqual, TokenKind::Bang),
                '=' => self.either('=', TokenKind::EqualEqual, TokenKind::Equal),
                '<' => self.either('=', TokenKind::LessEqual, TokenKind::Less),
                '>' => self.either('=', TokenKind::GreaterEqual, TokenKind::Greater),
                '"' => return self.scan_string(),
                '0'..='9' => return self.scan_number(),
                'a'..='z' | 'A'..='Z' | '_' => return Ok(self.scan_identifier()),
                _ => return Err(self.error(ParseError::BadChar(ch))),
            };
            return Ok(self.make_token(kind, None));
        }
    }

    fn scan_string(&mut self) -> Result<Token, SyntaxError> {
        let mut value = String::new();
        loop {
            match self.advance() {
                None => return Err(self.error(ParseError::UnterminatedString)),
                Some('"') => break,
                Some('\\') => match self.advance() {
                    None => return Err(self.error(ParseError::UnterminatedString)),
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('"') => value.push('"'),
                    Some('\\') => value.push('\\'),
                    Some(other) => {
                        if other == '\n' {
                            self.line += 1;
                        }
                        value.push('\\');
                        value.push(other);
                    }
                },
                Some(ch) => {
                    if ch == '\n' {
                        self.line += 1;
                    }
                    value.push(ch);
                }
            }
        }
        Ok(self.make_token(TokenKind::String, Some(Literal::Str(value))))
    }

    fn scan_number(&mut self) -> Result<Token, SyntaxError> {
        self.skip_digits();
        if self.peek() == Some('.') && self.peek_next().map_or(false, |ch| ch.is_ascii_digit()) {
            self.advance();
            self.skip_digits();
        }

        let lexeme = self.lexeme();
        let n = lexeme
            .parse::<f64>()
            .map_err(|_| self.error(ParseError::BadFloatLiteral(lexeme.to_string())))?;
        Ok(self.make_token(TokenKind::Number, Some(Literal::Number(n))))
    }

    fn skip_digits(&mut self) {
        while self.peek().map_or(false, |ch| ch.is_ascii_digit()) {
            self.advance();
        }
    }

    fn skip_comment(&mut self) {
        while self.peek().map_or(false, |ch| ch != '\n') {
            self.advance();
        }
    }

    fn scan_identifier(&mut self) -> Token {
        while self
            .peek()
            .map_or(false, |ch| ch.is_ascii_alphanumeric() || ch == '_')
        {
            self.advance();
        }

        // Only look the keyword up once the whole word is consumed.
        let kind = token::keyword(self.lexeme()).unwrap_or(TokenKind::Identifier);
        self.make_token(kind, None)
    }

    fn make_token(&mut self, kind: TokenKind, literal: Option<Literal>) -> Token {
        let lexeme = self.lexeme();
        Token::new(kind, lexeme, literal, self.line)
    }

    fn error(&self, error: ParseError) -> SyntaxError {
        SyntaxError {
            line: self.line,
            location: Location::Nowhere,
            error,
        }
    }

    /// Pick `matched` and consume `expected` if it comes next, `otherwise` if it does not.
    fn either(&mut self, expected: char, matched: TokenKind, otherwise: TokenKind) -> TokenKind {
        if self.matches(expected) {
            matched
        } else {
            otherwise
        }
    }

    fn matches(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn advance(&mut self) -> Option<char> {
        self.chars.next().map(|(_, ch)| ch)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, ch)| ch)
    }

    fn peek_next(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next().map(|(_, ch)| ch)
    }

    fn offset(&mut self) -> usize {
        let len = self.source.len();
        self.chars.peek().map_or(len, |&(i, _)| i)
    }

    fn lexeme(&mut self) -> &'a str {
        let end = self.offset();
        &self.source[self.start..end]
    }
}

impl Iterator for Scanner<'_> {
    type Item = Result<Token, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.get_token();
        if let Ok(Token {
            kind: TokenKind::Eof,
            ..
        }) = item
        {
            self.done = true;
        }
        Some(item)
    }
}

/// Scan the whole of `source`.
///
/// Returns every token (ending with `TokenKind::Eof`) along with every error encountered.
pub fn scan(source: &str) -> (Vec<Token>, Vec<SyntaxError>) {
    let mut tokens = vec![];
    let mut errors = vec![];
    for item in Scanner::new(source) {
        match item {
            Ok(token) => tokens.push(token),
            Err(e) => errors.push(e),
        }
    }
    (tokens, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Result<Vec<TokenKind>, SyntaxError> {
        Scanner::new(input)
            .map(|t| t.map(|t| t.kind))
            .collect::<Result<Vec<TokenKind>, SyntaxError>>()
    }

    fn single(input: &str) -> Result<Token, SyntaxError> {
        Scanner::new(input).get_token()
    }

    #[test]
    fn scan_single_token() -> Result<(), SyntaxError> {
        assert_eq!(kinds("+")?, vec![TokenKind::Plus, TokenKind::Eof]);
        Ok(())
    }

    #[test]
    fn empty_input_yields_eof_only() -> Result<(), SyntaxError> {
        let eof = single("")?;
        assert_eq!(eof, Token::new(TokenKind::Eof, "", None, 1));
        Ok(())
    }

    #[test]
    fn fixed_tokens() -> Result<(), SyntaxError> {
        assert_eq!(
            kinds("+-*/() = == != ! <> <= >=;,{}.")?,
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::Equal,
                TokenKind::EqualEqual,
                TokenKind::BangEqual,
                TokenKind::Bang,
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::Semicolon,
                TokenKind::Comma,
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::Dot,
                TokenKind::Eof,
            ]
        );
        Ok(())
    }

    #[test]
    fn two_char_operators_are_maximal() -> Result<(), SyntaxError> {
        assert_eq!(
            kinds("===")?,
            vec![TokenKind::EqualEqual, TokenKind::Equal, TokenKind::Eof]
        );
        Ok(())
    }

    #[test]
    fn blanks_are_ignored() -> Result<(), SyntaxError> {
        assert_eq!(kinds(" \t\r\n+")?, vec![TokenKind::Plus, TokenKind::Eof]);
        Ok(())
    }

    #[test]
    fn multi_digit_integer() -> Result<(), SyntaxError> {
        let t = single("42")?;
        assert_eq!(t.lexeme, "42");
        assert_eq!(t.literal, Some(Literal::Number(42.0)));
        Ok(())
    }

    #[test]
    fn floating_point() -> Result<(), SyntaxError> {
        assert_eq!(single("4.2")?.literal, Some(Literal::Number(4.2)));
        Ok(())
    }

    #[test]
    fn trailing_dot_is_not_fractional() -> Result<(), SyntaxError> {
        assert_eq!(
            kinds("4.")?,
            vec![TokenKind::Number, TokenKind::Dot, TokenKind::Eof]
        );
        Ok(())
    }

    #[test]
    fn scan_several_tokens_without_blanks() -> Result<(), SyntaxError> {
        assert_eq!(
            kinds("42+24")?,
            vec![
                TokenKind::Number,
                TokenKind::Plus,
                TokenKind::Number,
                TokenKind::Eof
            ]
        );
        Ok(())
    }

    #[test]
    fn scanner_keeps_track_of_lines() -> Result<(), SyntaxError> {
        let mut s = Scanner::new("1\n2 3\n4");
        assert_eq!(s.get_token()?.line, 1);
        assert_eq!(s.get_token()?.line, 2);
        assert_eq!(s.get_token()?.line, 2);
        assert_eq!(s.get_token()?.line, 3);
        assert_eq!(s.get_token()?.kind, TokenKind::Eof);
        Ok(())
    }

    #[test]
    fn identifier() -> Result<(), SyntaxError> {
        let lexemes = Scanner::new("f foo _foo t42")
            .map(|t| t.map(|t| (t.kind, t.lexeme)))
            .collect::<Result<Vec<_>, SyntaxError>>()?;
        assert_eq!(
            lexemes,
            vec![
                (TokenKind::Identifier, "f".to_string()),
                (TokenKind::Identifier, "foo".to_string()),
                (TokenKind::Identifier, "_foo".to_string()),
                (TokenKind::Identifier, "t42".to_string()),
                (TokenKind::Eof, "".to_string()),
            ]
        );
        Ok(())
    }

    #[test]
    fn keywords() -> Result<(), SyntaxError> {
        assert_eq!(
            kinds("and class else false for fun if nil or print return super this true var while")?,
            vec![
                TokenKind::And,
                TokenKind::Class,
                TokenKind::Else,
                TokenKind::False,
                TokenKind::For,
                TokenKind::Fun,
                TokenKind::If,
                TokenKind::Nil,
                TokenKind::Or,
                TokenKind::Print,
                TokenKind::Return,
                TokenKind::Super,
                TokenKind::This,
                TokenKind::True,
                TokenKind::Var,
                TokenKind::While,
                TokenKind::Eof,
            ]
        );
        Ok(())
    }

    #[test]
    fn keyword_prefix_is_an_identifier() -> Result<(), SyntaxError> {
        let t = single("forever")?;
        assert_eq!(t.kind, TokenKind::Identifier);
        assert_eq!(t.lexeme, "forever");
        Ok(())
    }

    #[test]
    fn comments_are_ignored() -> Result<(), SyntaxError> {
        assert_eq!(
            kinds("true // false\nnil")?,
            vec![TokenKind::True, TokenKind::Nil, TokenKind::Eof]
        );
        Ok(())
    }

    #[test]
    fn string_literal() -> Result<(), SyntaxError> {
        let t = single("\"hello\"")?;
        assert_eq!(t.kind, TokenKind::String);
        assert_eq!(t.lexeme, "\"hello\"");
        assert_eq!(t.literal, Some(Literal::Str("hello".to_string())));
        Ok(())
    }

    #[test]
    fn string_escapes_are_decoded() -> Result<(), SyntaxError> {
        let t = single(r#""a\tb\n\"c\"\\\q""#)?;
        assert_eq!(
            t.literal,
            Some(Literal::Str("a\tb\n\"c\"\\\\q".to_string()))
        );
        Ok(())
    }

    #[test]
    fn multi_line_string_counts_lines() -> Result<(), SyntaxError> {
        let mut s = Scanner::new("\"a\nb\" x");
        assert_eq!(
            s.get_token()?.literal,
            Some(Literal::Str("a\nb".to_string()))
        );
        assert_eq!(s.get_token()?.line, 2);
        Ok(())
    }

    #[test]
    fn unterminated_string() {
        let (tokens, errors) = scan("print \"abc\n");
        assert_eq!(
            errors,
            vec![SyntaxError {
                line: 2,
                location: Location::Nowhere,
                error: ParseError::UnterminatedString,
            }]
        );
        let kinds = tokens.iter().map(|t| t.kind).collect::<Vec<_>>();
        assert_eq!(kinds, vec![TokenKind::Print, TokenKind::Eof]);
    }

    #[test]
    fn bad_chars_are_reported_and_skipped() {
        let (tokens, errors) = scan("1 @ 2\n#");
        let kinds = tokens.iter().map(|t| t.kind).collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![TokenKind::Number, TokenKind::Number, TokenKind::Eof]
        );
        assert_eq!(
            errors,
            vec![
                SyntaxError {
                    line: 1,
                    location: Location::Nowhere,
                    error: ParseError::BadChar('@'),
                },
                SyntaxError {
                    line: 2,
                    location: Location::Nowhere,
                    error: ParseError::BadChar('#'),
                },
            ]
        );
    }

    #[test]
    fn non_ascii_char_inside_string() -> Result<(), SyntaxError> {
        assert_eq!(
            single("\"∏\"")?.literal,
            Some(Literal::Str("∏".to_string()))
        );
        Ok(())
    }
}
