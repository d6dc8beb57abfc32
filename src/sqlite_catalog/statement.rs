//! Parser for the DDL subset emitted by [`crate::ddl`].
//!
//! Accepted forms:
//!
//! ```text
//! CREATE NODE TABLE <name> (<column>, ...)
//! CREATE REL TABLE <name>(FROM <a> TO <b>[, <column>, ...])
//! DROP TABLE <name>
//! CREATE INDEX <index> ON <table>(<column>)
//! CALL CREATE_VECTOR_INDEX('<table>', '<index>', '<column>')
//! CALL CREATE_FTS_INDEX('<table>', '<index>', ['<column>'])
//! ```
//!
//! Anything else is a [`GraphSchemaError::ParseError`].

use crate::{catalog::CatalogIndexKind, errors::GraphSchemaError};

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Ident { text: String, quoted: bool },
    Str(String),
    Num(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Symbol(char),
    Eof,
}

#[derive(Clone, Debug)]
struct Spanned {
    token: Token,
    start: usize,
    end: usize,
}

fn tokenize(input: &str) -> Result<Vec<Spanned>, GraphSchemaError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        let token = match c {
            '(' | ')' | '[' | ']' | ',' | ';' => {
                chars.next();
                match c {
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    '[' => Token::LBracket,
                    ']' => Token::RBracket,
                    ',' => Token::Comma,
                    _ => Token::Semicolon,
                }
            }
            '`' => {
                chars.next();
                let mut text = String::new();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    if c == '`' {
                        if chars.peek().is_some_and(|&(_, next)| next == '`') {
                            chars.next();
                            text.push('`');
                            continue;
                        }
                        closed = true;
                        break;
                    }
                    text.push(c);
                }
                if !closed {
                    return Err(GraphSchemaError::parse(format!(
                        "unterminated quoted identifier at offset {start}"
                    )));
                }
                Token::Ident { text, quoted: true }
            }
            '\'' => {
                chars.next();
                let mut text = String::new();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    match c {
                        '\\' => {
                            if let Some((_, escaped)) = chars.next() {
                                text.push(escaped);
                            }
                        }
                        '\'' => {
                            closed = true;
                            break;
                        }
                        _ => text.push(c),
                    }
                }
                if !closed {
                    return Err(GraphSchemaError::parse(format!(
                        "unterminated string literal at offset {start}"
                    )));
                }
                Token::Str(text)
            }
            c if c.is_ascii_digit() || c == '-' => {
                let mut text = String::new();
                text.push(c);
                chars.next();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '.' || c == '+' || c == '-' {
                        text.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                Token::Num(text)
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut text = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        text.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                Token::Ident {
                    text,
                    quoted: false,
                }
            }
            other => {
                chars.next();
                Token::Symbol(other)
            }
        };
        let end = chars.peek().map(|&(i, _)| i).unwrap_or(input.len());
        tokens.push(Spanned { token, start, end });
    }
    tokens.push(Spanned {
        token: Token::Eof,
        start: input.len(),
        end: input.len(),
    });
    Ok(tokens)
}

/// Column clause as parsed back from a CREATE statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub storage_type: String,
    pub primary_key: bool,
    pub unique: bool,
    pub not_null: bool,
    pub default: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DdlStatement {
    CreateNodeTable {
        name: String,
        columns: Vec<ColumnDef>,
    },
    CreateRelTable {
        name: String,
        from: String,
        to: String,
        columns: Vec<ColumnDef>,
    },
    DropTable {
        name: String,
    },
    CreateIndex {
        index: String,
        table: String,
        column: String,
        kind: CatalogIndexKind,
    },
}

pub fn parse_statement(input: &str) -> Result<DdlStatement, GraphSchemaError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        source: input,
        tokens,
        pos: 0,
    };
    let statement = parser.statement()?;
    parser.eat(&Token::Semicolon);
    parser.expect_eof()?;
    Ok(statement)
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser<'_> {
    fn current(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .map(|s| &s.token)
            .unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.current() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn unexpected(&self, expected: &str) -> GraphSchemaError {
        GraphSchemaError::parse(format!(
            "expected {expected}, found {:?} in `{}`",
            self.current(),
            self.source
        ))
    }

    fn expect(&mut self, token: &Token, expected: &str) -> Result<(), GraphSchemaError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_eof(&self) -> Result<(), GraphSchemaError> {
        match self.current() {
            Token::Eof => Ok(()),
            _ => Err(self.unexpected("end of statement")),
        }
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(
            self.current(),
            Token::Ident { text, quoted: false } if text.eq_ignore_ascii_case(keyword)
        )
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.is_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), GraphSchemaError> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.unexpected(keyword))
        }
    }

    fn ident(&mut self, what: &str) -> Result<String, GraphSchemaError> {
        match self.current().clone() {
            Token::Ident { text, .. } => {
                self.advance();
                Ok(text)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    fn string(&mut self, what: &str) -> Result<String, GraphSchemaError> {
        match self.current().clone() {
            Token::Str(text) => {
                self.advance();
                Ok(text)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    fn statement(&mut self) -> Result<DdlStatement, GraphSchemaError> {
        if self.eat_keyword("CREATE") {
            if self.eat_keyword("NODE") {
                self.expect_keyword("TABLE")?;
                return self.create_node_table();
            }
            if self.eat_keyword("REL") {
                self.expect_keyword("TABLE")?;
                return self.create_rel_table();
            }
            if self.eat_keyword("INDEX") {
                return self.create_index();
            }
            return Err(self.unexpected("NODE, REL or INDEX"));
        }
        if self.eat_keyword("DROP") {
            self.expect_keyword("TABLE")?;
            let name = self.ident("table name")?;
            return Ok(DdlStatement::DropTable { name });
        }
        if self.eat_keyword("CALL") {
            return self.call_index();
        }
        Err(self.unexpected("CREATE, DROP or CALL"))
    }

    fn create_node_table(&mut self) -> Result<DdlStatement, GraphSchemaError> {
        let name = self.ident("table name")?;
        self.expect(&Token::LParen, "(")?;
        let columns = self.column_list()?;
        Ok(DdlStatement::CreateNodeTable { name, columns })
    }

    fn create_rel_table(&mut self) -> Result<DdlStatement, GraphSchemaError> {
        let name = self.ident("table name")?;
        self.expect(&Token::LParen, "(")?;
        self.expect_keyword("FROM")?;
        let from = self.ident("source table")?;
        self.expect_keyword("TO")?;
        let to = self.ident("target table")?;
        let columns = if self.eat(&Token::Comma) {
            self.column_list()?
        } else {
            self.expect(&Token::RParen, ")")?;
            Vec::new()
        };
        Ok(DdlStatement::CreateRelTable {
            name,
            from,
            to,
            columns,
        })
    }

    /// Columns up to and including the closing parenthesis.
    fn column_list(&mut self) -> Result<Vec<ColumnDef>, GraphSchemaError> {
        let mut columns = Vec::new();
        loop {
            columns.push(self.column()?);
            if self.eat(&Token::Comma) {
                continue;
            }
            self.expect(&Token::RParen, ", or )")?;
            return Ok(columns);
        }
    }

    fn column(&mut self) -> Result<ColumnDef, GraphSchemaError> {
        let name = self.ident("column name")?;
        let storage_type = self.storage_type()?;
        let mut column = ColumnDef {
            name,
            storage_type,
            primary_key: false,
            unique: false,
            not_null: false,
            default: None,
        };
        loop {
            if self.eat_keyword("PRIMARY") {
                self.expect_keyword("KEY")?;
                column.primary_key = true;
            } else if self.eat_keyword("UNIQUE") {
                column.unique = true;
            } else if self.eat_keyword("NOT") {
                self.expect_keyword("NULL")?;
                column.not_null = true;
            } else if self.eat_keyword("DEFAULT") {
                column.default = Some(self.default_expr()?);
            } else {
                return Ok(column);
            }
        }
    }

    fn storage_type(&mut self) -> Result<String, GraphSchemaError> {
        let mut storage = self.ident("column type")?.to_ascii_uppercase();
        while self.eat(&Token::LBracket) {
            match self.current().clone() {
                Token::Num(dims) => {
                    self.advance();
                    storage.push_str(&format!("[{dims}]"));
                }
                _ => storage.push_str("[]"),
            }
            self.expect(&Token::RBracket, "]")?;
        }
        Ok(storage)
    }

    /// Raw source text of a DEFAULT value, up to the next top-level `,` or `)`.
    fn default_expr(&mut self) -> Result<String, GraphSchemaError> {
        let start = self.tokens.get(self.pos).map(|s| s.start).unwrap_or(0);
        let mut end = start;
        let mut depth = 0usize;
        loop {
            match self.current() {
                Token::Eof => break,
                Token::Comma | Token::RParen if depth == 0 => break,
                Token::LParen | Token::LBracket => depth += 1,
                Token::RParen | Token::RBracket => depth = depth.saturating_sub(1),
                _ => {}
            }
            end = self.tokens.get(self.pos).map(|s| s.end).unwrap_or(end);
            self.advance();
        }
        let text = self.source[start..end].trim();
        if text.is_empty() {
            return Err(self.unexpected("default value"));
        }
        Ok(text.to_string())
    }

    fn create_index(&mut self) -> Result<DdlStatement, GraphSchemaError> {
        let index = self.ident("index name")?;
        self.expect_keyword("ON")?;
        let table = self.ident("table name")?;
        self.expect(&Token::LParen, "(")?;
        let column = self.ident("column name")?;
        self.expect(&Token::RParen, ")")?;
        Ok(DdlStatement::CreateIndex {
            index,
            table,
            column,
            kind: CatalogIndexKind::Plain,
        })
    }

    fn call_index(&mut self) -> Result<DdlStatement, GraphSchemaError> {
        let kind = if self.eat_keyword("CREATE_VECTOR_INDEX") {
            CatalogIndexKind::Vector
        } else if self.eat_keyword("CREATE_FTS_INDEX") {
            CatalogIndexKind::FullText
        } else {
            return Err(self.unexpected("CREATE_VECTOR_INDEX or CREATE_FTS_INDEX"));
        };
        self.expect(&Token::LParen, "(")?;
        let table = self.string("table name")?;
        self.expect(&Token::Comma, ",")?;
        let index = self.string("index name")?;
        self.expect(&Token::Comma, ",")?;
        let column = if kind == CatalogIndexKind::FullText {
            self.expect(&Token::LBracket, "[")?;
            let column = self.string("column name")?;
            if self.current() == &Token::Comma {
                return Err(GraphSchemaError::parse(
                    "full-text indexes over several columns are not supported",
                ));
            }
            self.expect(&Token::RBracket, "]")?;
            column
        } else {
            self.string("column name")?
        };
        self.expect(&Token::RParen, ")")?;
        Ok(DdlStatement::CreateIndex {
            index,
            table,
            column,
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_node_table_with_constraints() {
        let stmt = parse_statement(
            "CREATE NODE TABLE Person (id UUID PRIMARY KEY, name STRING NOT NULL, \
             score DOUBLE DEFAULT 1.5, `order` INT64 UNIQUE NOT NULL)",
        )
        .unwrap();
        let DdlStatement::CreateNodeTable { name, columns } = stmt else {
            panic!("expected node table");
        };
        assert_eq!(name, "Person");
        assert_eq!(columns.len(), 4);
        assert!(columns[0].primary_key);
        assert!(columns[1].not_null);
        assert_eq!(columns[2].default.as_deref(), Some("1.5"));
        assert_eq!(columns[3].name, "order");
        assert!(columns[3].unique && columns[3].not_null);
    }

    #[test]
    fn parses_rel_table_and_vector_types() {
        let stmt = parse_statement(
            "CREATE REL TABLE Likes(FROM Person TO Post, weights FLOAT[3], tags STRING[])",
        )
        .unwrap();
        let DdlStatement::CreateRelTable { from, to, columns, .. } = stmt else {
            panic!("expected rel table");
        };
        assert_eq!((from.as_str(), to.as_str()), ("Person", "Post"));
        assert_eq!(columns[0].storage_type, "FLOAT[3]");
        assert_eq!(columns[1].storage_type, "STRING[]");
    }

    #[test]
    fn default_keeps_function_calls_intact() {
        let stmt =
            parse_statement("CREATE NODE TABLE Event (id INT64 PRIMARY KEY, at TIMESTAMP NOT NULL DEFAULT current_timestamp())")
                .unwrap();
        let DdlStatement::CreateNodeTable { columns, .. } = stmt else {
            panic!("expected node table");
        };
        assert_eq!(columns[1].default.as_deref(), Some("current_timestamp()"));
    }

    #[test]
    fn parses_index_calls() {
        assert_eq!(
            parse_statement("CALL CREATE_FTS_INDEX('Post', 'post_body_fts_idx', ['body'])").unwrap(),
            DdlStatement::CreateIndex {
                index: "post_body_fts_idx".into(),
                table: "Post".into(),
                column: "body".into(),
                kind: CatalogIndexKind::FullText,
            }
        );
    }

    #[test]
    fn rejects_unknown_statements() {
        assert!(parse_statement("MATCH (n) RETURN n").is_err());
        assert!(parse_statement("DROP TABLE Person extra").is_err());
    }
}
