//! Parser for the project DSL.

use super::ast::*;
use super::lexer::{parse_value, Lexer, Token, TokenKind};
use crate::error::{FlowError, Result};
use crate::recipe::AttrValue;

/// Parser for project DSL.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Create a new parser with the given lexer.
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self> {
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    /// Parse the entire project.
    pub fn parse(&mut self) -> Result<ProjectAst> {
        let mut ast = ProjectAst::default();

        while self.current.kind != TokenKind::Eof {
            match &self.current.kind {
                TokenKind::Newline => {
                    self.advance()?;
                    continue;
                }
                TokenKind::Directive => {
                    let def = self.parse_directive()?;
                    ast.recipes.push(def);
                }
                TokenKind::Identifier => {
                    let line = self.current.line;
                    let recipe = ast.recipes.last_mut().ok_or_else(|| {
                        FlowError::parse(line, "ingredient line outside of a .recipe block")
                    })?;
                    Self::parse_io_line(self, recipe)?;
                }
                _ => {
                    return Err(FlowError::parse(
                        self.current.line,
                        format!("unexpected token: {:?}", self.current.text),
                    ));
                }
            }

            self.end_of_line()?;
        }

        Ok(ast)
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.current.kind == kind {
            let tok = self.current.clone();
            self.advance()?;
            Ok(tok)
        } else {
            Err(FlowError::parse(
                self.current.line,
                format!("expected {:?}, got {:?}", kind, self.current.kind),
            ))
        }
    }

    fn end_of_line(&mut self) -> Result<()> {
        match self.current.kind {
            TokenKind::Newline => self.advance(),
            TokenKind::Eof => Ok(()),
            _ => Err(FlowError::parse(
                self.current.line,
                format!("unexpected {:?} at end of line", self.current.text),
            )),
        }
    }

    /// A name is either a quoted string or a single bare word.
    fn parse_name(&mut self, what: &str) -> Result<String> {
        match self.current.kind {
            TokenKind::String | TokenKind::Identifier => {
                let text = self.current.text.clone();
                self.advance()?;
                Ok(text)
            }
            _ => Err(FlowError::parse(
                self.current.line,
                format!("expected {}, got {:?}", what, self.current.text),
            )),
        }
    }

    fn parse_number(&mut self) -> Result<f64> {
        let tok = self.expect(TokenKind::Number)?;
        parse_value(&tok.text)
            .ok_or_else(|| FlowError::parse(tok.line, format!("invalid number: {}", tok.text)))
    }

    fn parse_directive(&mut self) -> Result<RecipeDef> {
        let directive = self.current.text.clone();
        let line = self.current.line;
        self.advance()?;

        match directive.to_lowercase().as_str() {
            ".recipe" => {
                let machine = self.parse_name("machine name")?;
                let mut def = RecipeDef::new(machine, line);
                while self.current.kind == TokenKind::Identifier {
                    let key = self.current.text.to_lowercase();
                    self.advance()?;
                    self.expect(TokenKind::Equals)?;
                    let value = self.parse_attr_value()?;
                    def.params.push((key, value));
                }
                Ok(def)
            }
            _ => Err(FlowError::parse(
                line,
                format!("unknown directive: {}", directive),
            )),
        }
    }

    fn parse_attr_value(&mut self) -> Result<AttrValue> {
        let tok = self.current.clone();
        self.advance()?;
        match tok.kind {
            TokenKind::Number => {
                let value = parse_value(&tok.text).ok_or_else(|| {
                    FlowError::parse(tok.line, format!("invalid number: {}", tok.text))
                })?;
                let is_float_literal = tok.text.contains(['.', 'e', 'E']);
                if !is_float_literal && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
                    Ok(AttrValue::Int(value as i64))
                } else {
                    Ok(AttrValue::Float(value))
                }
            }
            TokenKind::Identifier => match tok.text.to_lowercase().as_str() {
                "true" => Ok(AttrValue::Bool(true)),
                "false" => Ok(AttrValue::Bool(false)),
                other => Ok(AttrValue::Text(other.to_string())),
            },
            TokenKind::String => Ok(AttrValue::Text(tok.text.to_lowercase())),
            _ => Err(FlowError::parse(
                tok.line,
                format!("expected attribute value, got {:?}", tok.text),
            )),
        }
    }

    fn parse_io_line(&mut self, recipe: &mut RecipeDef) -> Result<()> {
        let keyword = self.current.clone();
        let kind = IoKeyword::from_keyword(&keyword.text).ok_or_else(|| {
            FlowError::parse(
                keyword.line,
                format!("expected in, out or target, got {:?}", keyword.text),
            )
        })?;
        self.advance()?;

        let name = self.parse_name("ingredient name")?;
        let quantity = self.parse_number()?;
        let io = IoLine {
            name,
            quantity,
            line: keyword.line,
        };
        match kind {
            IoKeyword::In => recipe.inputs.push(io),
            IoKeyword::Out => recipe.outputs.push(io),
            IoKeyword::Target => recipe.targets.push(io),
        }
        Ok(())
    }
}
