//! Arithmetic parser for formula bodies.
//!
//! A recursive descent parser over numbers, the four basic operators and
//! parentheses. Cell references are substituted before parsing, so the
//! grammar has no identifiers and nothing can be executed besides
//! arithmetic.
//!
//! # Grammar
//!
//! ```bnf
//! Expression ::= Term ( ( "+" | "-" ) Term )*
//! Term       ::= Unary ( ( "*" | "/" ) Unary )*
//! Unary      ::= ( "+" | "-" ) Unary | Primary
//! Primary    ::= Number | "(" Expression ")"
//! Number     ::= [0-9]+ ( "." [0-9]* )? | "." [0-9]+
//! ```
//!
//! Binary operators are left-associative; unary signs bind tighter than
//! `*` and `/`.
//!
//! Both the parser recursion and the depth of the resulting tree are capped
//! at [`MAX_DEPTH`], so evaluating and dropping an [`Expr`] stays shallow.

use super::errors::{FormulaError, FormulaResult};

/// Deepest nesting of parentheses, unary signs and chained operators.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Plus,
    Minus,
    Multiply,
    Divide,
    LeftParen,
    RightParen,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Binary {
        left: Box<Expr>,
        operator: BinaryOp,
        right: Box<Expr>,
    },
    Unary {
        operator: UnaryOp,
        operand: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    Plus,
    Minus,
}

/// Splits a formula body into tokens.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current_char = chars.first().copied();

        Self {
            input: chars,
            position: 0,
            current_char,
        }
    }

    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    fn skip_whitespace(&mut self) {
        while self.current_char.is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn read_digits(&mut self, out: &mut String) {
        while let Some(ch) = self.current_char.filter(char::is_ascii_digit) {
            out.push(ch);
            self.advance();
        }
    }

    fn read_number(&mut self) -> FormulaResult<f64> {
        let mut number_str = String::new();
        self.read_digits(&mut number_str);

        if self.current_char == Some('.') {
            number_str.push('.');
            self.advance();
            self.read_digits(&mut number_str);
        }

        number_str
            .parse::<f64>()
            .map_err(|_| FormulaError::InvalidNumber(number_str))
    }

    pub fn next_token(&mut self) -> FormulaResult<Token> {
        self.skip_whitespace();

        let Some(ch) = self.current_char else {
            return Ok(Token::Eof);
        };

        let token = match ch {
            '0'..='9' | '.' => return self.read_number().map(Token::Number),
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Multiply,
            '/' => Token::Divide,
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            _ => {
                return Err(FormulaError::UnexpectedCharacter {
                    ch,
                    position: self.position,
                });
            }
        };
        self.advance();
        Ok(token)
    }
}

/// Recursive descent parser producing an [`Expr`] tree.
pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    nesting: usize,
}

impl Parser {
    pub fn new(input: &str) -> FormulaResult<Self> {
        let mut lexer = Lexer::new(input);
        let current_token = lexer.next_token()?;

        Ok(Self {
            lexer,
            current_token,
            nesting: 0,
        })
    }

    fn advance(&mut self) -> FormulaResult<()> {
        self.current_token = self.lexer.next_token()?;
        Ok(())
    }

    fn unexpected(&self) -> FormulaError {
        FormulaError::UnexpectedToken(format!("{:?}", self.current_token))
    }

    fn enter(&mut self) -> FormulaResult<()> {
        self.nesting += 1;
        if self.nesting > MAX_DEPTH {
            return Err(FormulaError::NestingTooDeep(MAX_DEPTH));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.nesting -= 1;
    }

    /// Parses the whole input; trailing tokens are an error.
    pub fn parse(&mut self) -> FormulaResult<Expr> {
        let (expr, _) = self.parse_expression()?;

        if self.current_token != Token::Eof {
            return Err(self.unexpected());
        }

        Ok(expr)
    }

    // Each parse_* returns the node with the depth of its tree.
    fn parse_expression(&mut self) -> FormulaResult<(Expr, usize)> {
        let (mut left, mut depth) = self.parse_term()?;

        loop {
            let operator = match self.current_token {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Subtract,
                _ => break,
            };
            self.advance()?;
            let (right, right_depth) = self.parse_term()?;
            depth = deeper(depth.max(right_depth))?;
            left = Expr::Binary {
                left: Box::new(left),
                operator,
                right: Box::new(right),
            };
        }

        Ok((left, depth))
    }

    fn parse_term(&mut self) -> FormulaResult<(Expr, usize)> {
        let (mut left, mut depth) = self.parse_unary()?;

        loop {
            let operator = match self.current_token {
                Token::Multiply => BinaryOp::Multiply,
                Token::Divide => BinaryOp::Divide,
                _ => break,
            };
            self.advance()?;
            let (right, right_depth) = self.parse_unary()?;
            depth = deeper(depth.max(right_depth))?;
            left = Expr::Binary {
                left: Box::new(left),
                operator,
                right: Box::new(right),
            };
        }

        Ok((left, depth))
    }

    fn parse_unary(&mut self) -> FormulaResult<(Expr, usize)> {
        let operator = match self.current_token {
            Token::Plus => UnaryOp::Plus,
            Token::Minus => UnaryOp::Minus,
            _ => return self.parse_primary(),
        };
        self.advance()?;
        self.enter()?;
        let (operand, depth) = self.parse_unary()?;
        self.leave();
        let expr = Expr::Unary {
            operator,
            operand: Box::new(operand),
        };
        Ok((expr, deeper(depth)?))
    }

    fn parse_primary(&mut self) -> FormulaResult<(Expr, usize)> {
        match self.current_token {
            Token::Number(value) => {
                self.advance()?;
                Ok((Expr::Number(value), 1))
            }
            Token::LeftParen => {
                self.advance()?;
                self.enter()?;
                let parsed = self.parse_expression()?;
                self.leave();
                if self.current_token != Token::RightParen {
                    return Err(self.unexpected());
                }
                self.advance()?;
                Ok(parsed)
            }
            _ => Err(self.unexpected()),
        }
    }
}

fn deeper(depth: usize) -> FormulaResult<usize> {
    if depth >= MAX_DEPTH {
        return Err(FormulaError::NestingTooDeep(MAX_DEPTH));
    }
    Ok(depth + 1)
}

impl Expr {
    /// Evaluates the tree with IEEE-754 arithmetic.
    ///
    /// Division by zero and any non-finite intermediate result are errors.
    pub fn evaluate(&self) -> FormulaResult<f64> {
        let value = match self {
            Expr::Number(value) => *value,
            Expr::Unary { operator, operand } => {
                let value = operand.evaluate()?;
                match operator {
                    UnaryOp::Plus => value,
                    UnaryOp::Minus => -value,
                }
            }
            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left = left.evaluate()?;
                let right = right.evaluate()?;
                match operator {
                    BinaryOp::Add => left + right,
                    BinaryOp::Subtract => left - right,
                    BinaryOp::Multiply => left * right,
                    BinaryOp::Divide => {
                        if right == 0.0 {
                            return Err(FormulaError::DivisionByZero);
                        }
                        left / right
                    }
                }
            }
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(FormulaError::NonFiniteResult)
        }
    }
}

/// Parses and evaluates an arithmetic expression in one step.
pub fn parse_and_evaluate(input: &str) -> FormulaResult<f64> {
    Parser::new(input)?.parse()?.evaluate()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            if token == Token::Eof {
                return out;
            }
            out.push(token);
        }
    }

    #[test]
    fn test_lexer_numbers() {
        assert_eq!(
            tokens("42 2.75 0.5 .25 7."),
            vec![
                Token::Number(42.0),
                Token::Number(2.75),
                Token::Number(0.5),
                Token::Number(0.25),
                Token::Number(7.0),
            ]
        );
    }

    #[test]
    fn test_lexer_operators() {
        assert_eq!(
            tokens("+ - * / ( )"),
            vec![
                Token::Plus,
                Token::Minus,
                Token::Multiply,
                Token::Divide,
                Token::LeftParen,
                Token::RightParen,
            ]
        );
    }

    #[test]
    fn test_lexer_rejects_everything_else() {
        for input in ["a", "A1", "2 % 3", "2 ^ 3", "alert(1)", "1,2", "\"x\""] {
            let mut lexer = Lexer::new(input);
            let result = std::iter::from_fn(|| match lexer.next_token() {
                Ok(Token::Eof) => None,
                other => Some(other),
            })
            .find(Result::is_err);
            assert!(result.is_some(), "{input:?} should not tokenize");
        }
        assert!(matches!(
            Lexer::new(".").next_token(),
            Err(FormulaError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_parser_operator_precedence() {
        // 2 + 3 * 4 parses as 2 + (3 * 4)
        let expr = Parser::new("2 + 3 * 4").unwrap().parse().unwrap();
        match expr {
            Expr::Binary {
                left,
                operator: BinaryOp::Add,
                right,
            } => {
                assert_eq!(*left, Expr::Number(2.0));
                assert!(matches!(
                    *right,
                    Expr::Binary {
                        operator: BinaryOp::Multiply,
                        ..
                    }
                ));
            }
            other => panic!("expected addition at top level, got {other:?}"),
        }
    }

    #[test]
    fn test_parser_left_associativity() {
        assert_eq!(parse_and_evaluate("10 - 4 - 3").unwrap(), 3.0);
        assert_eq!(parse_and_evaluate("64 / 4 / 2").unwrap(), 8.0);
    }

    #[test]
    fn test_parentheses_and_unary() {
        assert_eq!(parse_and_evaluate("(2 + 3) * 4").unwrap(), 20.0);
        assert_eq!(parse_and_evaluate("-5 + 10").unwrap(), 5.0);
        assert_eq!(parse_and_evaluate("2 - -3").unwrap(), 5.0);
        assert_eq!(parse_and_evaluate("-(1 + 2) * +2").unwrap(), -6.0);
        assert_eq!(parse_and_evaluate("((1.5))").unwrap(), 1.5);
    }

    #[test]
    fn test_parser_errors() {
        for input in ["", "2 +", "(2 + 3", "2 + 3)", "()", "* 2", "2 3", "1..2"] {
            assert!(parse_and_evaluate(input).is_err(), "{input:?} should fail");
        }
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let deep = MAX_DEPTH * 80;
        let parens = format!("{}1{}", "(".repeat(deep), ")".repeat(deep));
        assert_eq!(
            parse_and_evaluate(&parens),
            Err(FormulaError::NestingTooDeep(MAX_DEPTH))
        );

        let signs = format!("{}1", "-".repeat(deep * 2));
        assert_eq!(
            parse_and_evaluate(&signs),
            Err(FormulaError::NestingTooDeep(MAX_DEPTH))
        );

        // A flat chain still builds a left-deep tree.
        let chain = vec!["1"; deep].join("+");
        assert_eq!(
            parse_and_evaluate(&chain),
            Err(FormulaError::NestingTooDeep(MAX_DEPTH))
        );
    }

    #[test]
    fn test_nesting_within_limit() {
        let parens = format!("{}2{}", "(".repeat(200), ")".repeat(200));
        assert_eq!(parse_and_evaluate(&parens).unwrap(), 2.0);
        assert_eq!(parse_and_evaluate(&format!("{}3", "-".repeat(100))).unwrap(), 3.0);
        assert_eq!(parse_and_evaluate(&vec!["1"; 200].join("+")).unwrap(), 200.0);
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(parse_and_evaluate("2/0"), Err(FormulaError::DivisionByZero));
        assert_eq!(parse_and_evaluate("0/0"), Err(FormulaError::DivisionByZero));
        assert_eq!(parse_and_evaluate("1/(2-2)"), Err(FormulaError::DivisionByZero));
    }

    #[test]
    fn test_overflow_is_not_finite() {
        let huge = format!("1{}", "0".repeat(308));
        assert_eq!(
            parse_and_evaluate(&format!("{huge} * 10")),
            Err(FormulaError::NonFiniteResult)
        );
    }
}
