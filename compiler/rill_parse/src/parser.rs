//! Recursive-descent parser.
//!
//! Newline handling follows the usual R rules: a newline ends a statement at
//! top level and directly inside `{ }`, but is insignificant inside `( )` and
//! after anything that cannot end an expression (binary operators, commas,
//! `function(...)`, `if (...)` and friends). The parser keeps a stack of the
//! enclosing brackets to decide which rule applies.

use rill_ir::{Arg, BinaryOp, Expr, ExprKind, Literal, Param, Span, StringInterner, UnaryOp};
use rill_stack::ensure_sufficient_stack;

use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{Spanned, Token};

type ParseResult<T> = Result<T, ParseError>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Bracket {
    Paren,
    Brace,
}

pub(crate) struct Parser<'src, 'i> {
    source: &'src str,
    tokens: Vec<Spanned>,
    pos: usize,
    brackets: Vec<Bracket>,
    interner: &'i StringInterner,
}

impl<'src, 'i> Parser<'src, 'i> {
    pub(crate) fn new(source: &'src str, tokens: Vec<Spanned>, interner: &'i StringInterner) -> Self {
        Parser {
            source,
            tokens,
            pos: 0,
            brackets: Vec::new(),
            interner,
        }
    }

    // Token access

    fn newlines_significant(&self) -> bool {
        !matches!(self.brackets.last(), Some(Bracket::Paren))
    }

    fn raw(&self) -> &Spanned {
        // The token vector always ends with Eof and `pos` never passes it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    /// Current token, skipping newlines where they carry no meaning.
    fn peek(&mut self) -> &Token {
        if !self.newlines_significant() {
            self.skip_newlines();
        }
        &self.raw().token
    }

    fn peek_span(&mut self) -> Span {
        self.peek();
        self.raw().span
    }

    fn bump(&mut self) -> Spanned {
        let tok = self.raw().clone();
        if tok.token != Token::Eof {
            self.pos += 1;
        }
        tok
    }

    fn skip_newlines(&mut self) {
        while self.raw().token == Token::Newline {
            self.pos += 1;
        }
    }

    fn at(&mut self, token: &Token) -> bool {
        self.peek() == token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.at(token) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> ParseResult<Span> {
        if self.at(token) {
            Ok(self.bump().span)
        } else {
            Err(self.unexpected())
        }
    }

    /// Error for the current token.
    fn unexpected(&mut self) -> ParseError {
        self.peek();
        let current = self.raw().clone();
        let kind = if current.token == Token::Eof {
            ParseErrorKind::UnexpectedEof
        } else {
            let slice = self
                .source
                .get(current.span.start as usize..current.span.end as usize)
                .unwrap_or_default();
            ParseErrorKind::UnexpectedToken {
                text: current.token.describe(slice),
            }
        };
        ParseError::new(kind, current.span, self.source)
    }

    fn with_bracket<T>(&mut self, bracket: Bracket, f: impl FnOnce(&mut Self) -> T) -> T {
        self.brackets.push(bracket);
        let result = f(self);
        self.brackets.pop();
        result
    }

    // Statements

    /// Parse the whole input as a sequence of top-level expressions.
    pub(crate) fn parse_program(&mut self) -> ParseResult<Vec<Expr>> {
        let mut exprs = Vec::new();
        loop {
            self.skip_separators();
            if self.at(&Token::Eof) {
                return Ok(exprs);
            }
            exprs.push(self.parse_expr()?);
            match self.peek() {
                Token::Newline | Token::Semi => {
                    self.bump();
                }
                Token::Eof => return Ok(exprs),
                _ => return Err(self.unexpected()),
            }
        }
    }

    fn skip_separators(&mut self) {
        while matches!(self.raw().token, Token::Newline | Token::Semi) {
            self.pos += 1;
        }
    }

    fn parse_block(&mut self, open: Span) -> ParseResult<Expr> {
        self.with_bracket(Bracket::Brace, |p| {
            let mut exprs = Vec::new();
            loop {
                p.skip_separators();
                if p.at(&Token::RBrace) {
                    let close = p.bump().span;
                    return Ok(Expr::new(ExprKind::Block(exprs), open.merge(close)));
                }
                exprs.push(p.parse_expr()?);
                match p.peek() {
                    Token::Newline | Token::Semi => {
                        p.bump();
                    }
                    Token::RBrace => {}
                    _ => return Err(p.unexpected()),
                }
            }
        })
    }

    // Expressions

    pub(crate) fn parse_expr(&mut self) -> ParseResult<Expr> {
        ensure_sufficient_stack(|| self.parse_assignment())
    }

    fn parse_assignment(&mut self) -> ParseResult<Expr> {
        let target = self.parse_or()?;
        let superassign = match self.peek() {
            Token::LeftAssign | Token::Eq => false,
            Token::SuperAssign => true,
            _ => return Ok(target),
        };
        let ExprKind::Ident(name) = target.kind else {
            return Err(self.unexpected());
        };
        self.bump();
        self.skip_newlines();
        let value = Box::new(self.parse_assignment()?);
        let span = target.span.merge(value.span);
        let kind = if superassign {
            ExprKind::SuperAssign { name, value }
        } else {
            ExprKind::Assign { name, value }
        };
        Ok(Expr::new(kind, span))
    }

    fn parse_binary_level(
        &mut self,
        next: fn(&mut Self) -> ParseResult<Expr>,
        op_for: fn(&Token) -> Option<BinaryOp>,
    ) -> ParseResult<Expr> {
        let mut lhs = next(self)?;
        while let Some(op) = op_for(self.peek()) {
            self.bump();
            self.skip_newlines();
            let rhs = next(self)?;
            let span = lhs.span.merge(rhs.span);
            lhs = Expr::new(
                ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
        Ok(lhs)
    }

    fn parse_or(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(Self::parse_and, |t| match t {
            Token::PipePipe => Some(BinaryOp::OrOr),
            Token::Pipe => Some(BinaryOp::Or),
            _ => None,
        })
    }

    fn parse_and(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(Self::parse_not, |t| match t {
            Token::AmpAmp => Some(BinaryOp::AndAnd),
            Token::Amp => Some(BinaryOp::And),
            _ => None,
        })
    }

    fn parse_not(&mut self) -> ParseResult<Expr> {
        if self.at(&Token::Bang) {
            let start = self.bump().span;
            let operand = ensure_sufficient_stack(|| self.parse_not())?;
            let span = start.merge(operand.span);
            return Ok(Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                },
                span,
            ));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(Self::parse_additive, |t| match t {
            Token::EqEq => Some(BinaryOp::Eq),
            Token::NotEq => Some(BinaryOp::NotEq),
            Token::Lt => Some(BinaryOp::Lt),
            Token::LtEq => Some(BinaryOp::LtEq),
            Token::Gt => Some(BinaryOp::Gt),
            Token::GtEq => Some(BinaryOp::GtEq),
            _ => None,
        })
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(Self::parse_multiplicative, |t| match t {
            Token::Plus => Some(BinaryOp::Add),
            Token::Minus => Some(BinaryOp::Sub),
            _ => None,
        })
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(Self::parse_unary, |t| match t {
            Token::Star => Some(BinaryOp::Mul),
            Token::Slash => Some(BinaryOp::Div),
            _ => None,
        })
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        match self.peek() {
            Token::Minus => {
                let start = self.bump().span;
                let operand = ensure_sufficient_stack(|| self.parse_unary())?;
                let span = start.merge(operand.span);
                Ok(Expr::new(
                    ExprKind::Unary {
                        op: UnaryOp::Neg,
                        operand: Box::new(operand),
                    },
                    span,
                ))
            }
            Token::Plus => {
                self.bump();
                ensure_sufficient_stack(|| self.parse_unary())
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> ParseResult<Expr> {
        let base = self.parse_postfix()?;
        if !self.eat(&Token::Caret) {
            return Ok(base);
        }
        self.skip_newlines();
        // Right associative, and binds tighter than unary minus on its left.
        let exponent = ensure_sufficient_stack(|| self.parse_unary())?;
        let span = base.span.merge(exponent.span);
        Ok(Expr::new(
            ExprKind::Binary {
                op: BinaryOp::Pow,
                lhs: Box::new(base),
                rhs: Box::new(exponent),
            },
            span,
        ))
    }

    fn parse_postfix(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_primary()?;
        // A call's opening parenthesis must be on the same line as the callee.
        while self.raw().token == Token::LParen
            || (!self.newlines_significant() && self.at(&Token::LParen))
        {
            self.bump();
            let (args, close) = self.with_bracket(Bracket::Paren, Self::parse_args)?;
            let span = expr.span.merge(close);
            expr = Expr::new(
                ExprKind::Call {
                    callee: Box::new(expr),
                    args,
                },
                span,
            );
        }
        Ok(expr)
    }

    fn parse_args(&mut self) -> ParseResult<(Vec<Arg>, Span)> {
        let mut args = Vec::new();
        if self.at(&Token::RParen) {
            return Ok((args, self.bump().span));
        }
        loop {
            args.push(self.parse_arg()?);
            if self.eat(&Token::Comma) {
                continue;
            }
            let close = self.expect(&Token::RParen)?;
            return Ok((args, close));
        }
    }

    fn parse_arg(&mut self) -> ParseResult<Arg> {
        let named = match (self.peek().clone(), self.lookahead_is_eq()) {
            (Token::Ident(text) | Token::Str(text), true) => Some(self.interner.intern(&text)),
            _ => None,
        };
        if named.is_some() {
            self.bump();
            self.bump();
        }
        let value = self.parse_expr()?;
        Ok(Arg { name: named, value })
    }

    /// Is the token after the current one a single `=`?
    fn lookahead_is_eq(&mut self) -> bool {
        self.peek();
        self.tokens
            .iter()
            .skip(self.pos + 1)
            .find(|t| t.token != Token::Newline)
            .is_some_and(|t| t.token == Token::Eq)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let span = self.peek_span();
        let token = self.peek().clone();
        match token {
            Token::Double(v) => {
                self.bump();
                Ok(Expr::new(ExprKind::Literal(Literal::Double(v)), span))
            }
            Token::Int(v) => {
                self.bump();
                Ok(Expr::new(ExprKind::Literal(Literal::Int(v)), span))
            }
            Token::Str(s) => {
                self.bump();
                Ok(Expr::new(ExprKind::Literal(Literal::Str(s)), span))
            }
            Token::True | Token::False => {
                self.bump();
                let b = token == Token::True;
                Ok(Expr::new(ExprKind::Literal(Literal::Logical(b)), span))
            }
            Token::Null => {
                self.bump();
                Ok(Expr::new(ExprKind::Literal(Literal::Null), span))
            }
            Token::Ident(text) => {
                self.bump();
                Ok(Expr::new(ExprKind::Ident(self.interner.intern(&text)), span))
            }
            Token::LParen => {
                self.bump();
                let (inner, close) = self.with_bracket(Bracket::Paren, |p| {
                    let inner = p.parse_expr()?;
                    let close = p.expect(&Token::RParen)?;
                    Ok::<_, ParseError>((inner, close))
                })?;
                Ok(Expr::new(ExprKind::Paren(Box::new(inner)), span.merge(close)))
            }
            Token::LBrace => {
                self.bump();
                self.parse_block(span)
            }
            Token::Function => {
                self.bump();
                self.parse_function(span)
            }
            Token::If => {
                self.bump();
                self.parse_if(span)
            }
            Token::While => {
                self.bump();
                let cond = self.parse_condition()?;
                self.skip_newlines();
                let body = self.parse_expr()?;
                let full = span.merge(body.span);
                Ok(Expr::new(
                    ExprKind::While {
                        cond: Box::new(cond),
                        body: Box::new(body),
                    },
                    full,
                ))
            }
            Token::Repeat => {
                self.bump();
                self.skip_newlines();
                let body = self.parse_expr()?;
                let full = span.merge(body.span);
                Ok(Expr::new(ExprKind::Repeat(Box::new(body)), full))
            }
            Token::Break => {
                self.bump();
                Ok(Expr::new(ExprKind::Break, span))
            }
            Token::Next => {
                self.bump();
                Ok(Expr::new(ExprKind::Next, span))
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_condition(&mut self) -> ParseResult<Expr> {
        self.expect(&Token::LParen)?;
        self.with_bracket(Bracket::Paren, |p| {
            let cond = p.parse_expr()?;
            p.expect(&Token::RParen)?;
            Ok(cond)
        })
    }

    fn parse_if(&mut self, start: Span) -> ParseResult<Expr> {
        let cond = self.parse_condition()?;
        self.skip_newlines();
        let then_branch = self.parse_expr()?;

        // `else` on a following line only continues the `if` inside braces.
        let mut else_branch = None;
        let save = self.pos;
        if matches!(self.brackets.last(), Some(Bracket::Brace)) {
            self.skip_newlines();
        }
        if self.eat(&Token::Else) {
            self.skip_newlines();
            else_branch = Some(Box::new(self.parse_expr()?));
        } else {
            self.pos = save;
        }

        let end = else_branch.as_ref().map_or(then_branch.span, |e| e.span);
        Ok(Expr::new(
            ExprKind::If {
                cond: Box::new(cond),
                then_branch: Box::new(then_branch),
                else_branch,
            },
            start.merge(end),
        ))
    }

    fn parse_function(&mut self, start: Span) -> ParseResult<Expr> {
        self.expect(&Token::LParen)?;
        let params = self.with_bracket(Bracket::Paren, Self::parse_params)?;
        self.skip_newlines();
        let body = self.parse_expr()?;
        let span = start.merge(body.span);
        Ok(Expr::new(
            ExprKind::Function {
                params,
                body: Box::new(body),
            },
            span,
        ))
    }

    fn parse_params(&mut self) -> ParseResult<Vec<Param>> {
        let mut params = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(params);
        }
        loop {
            let Token::Ident(text) = self.peek().clone() else {
                return Err(self.unexpected());
            };
            self.bump();
            let name = self.interner.intern(&text);
            let default = if self.eat(&Token::Eq) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            params.push(Param { name, default });
            if self.eat(&Token::Comma) {
                continue;
            }
            self.expect(&Token::RParen)?;
            return Ok(params);
        }
    }
}
