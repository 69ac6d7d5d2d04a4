//! Operator precedence table for binary expression parsing.

use crate::ast::{BinaryOperator, LogicalOperator};
use crate::token::Token;

/// Operator precedence level (higher = tighter binding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    None = 0,
    LogicalOr = 1,      // ||
    LogicalAnd = 2,     // &&
    BitwiseOr = 3,      // |
    BitwiseXor = 4,     // ^
    BitwiseAnd = 5,     // &
    Equality = 6,       // ==, !=, ===, !==
    Relational = 7,     // <, >, <=, >=, instanceof, in
    Shift = 8,          // <<, >>, >>>
    Additive = 9,       // +, -
    Multiplicative = 10, // *, /, %
}

impl Precedence {
    /// The next tighter level, used for the right operand of a
    /// left-associative operator.
    pub fn tighter(self) -> Precedence {
        match self {
            Precedence::None => Precedence::LogicalOr,
            Precedence::LogicalOr => Precedence::LogicalAnd,
            Precedence::LogicalAnd => Precedence::BitwiseOr,
            Precedence::BitwiseOr => Precedence::BitwiseXor,
            Precedence::BitwiseXor => Precedence::BitwiseAnd,
            Precedence::BitwiseAnd => Precedence::Equality,
            Precedence::Equality => Precedence::Relational,
            Precedence::Relational => Precedence::Shift,
            Precedence::Shift => Precedence::Additive,
            Precedence::Additive | Precedence::Multiplicative => Precedence::Multiplicative,
        }
    }
}

/// A parsed binary operator token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOperator {
    Binary(BinaryOperator),
    Logical(LogicalOperator),
}

/// Look up a binary operator token.
///
/// `in` is excluded when `allow_in` is false, as in the head of a `for`.
pub fn infix_operator(token: &Token, allow_in: bool) -> Option<(InfixOperator, Precedence)> {
    use BinaryOperator as B;
    let (op, prec) = match token {
        Token::PipePipe => (InfixOperator::Logical(LogicalOperator::Or), Precedence::LogicalOr),
        Token::AmpAmp => (InfixOperator::Logical(LogicalOperator::And), Precedence::LogicalAnd),
        Token::Pipe => (InfixOperator::Binary(B::BitwiseOr), Precedence::BitwiseOr),
        Token::Caret => (InfixOperator::Binary(B::BitwiseXor), Precedence::BitwiseXor),
        Token::Amp => (InfixOperator::Binary(B::BitwiseAnd), Precedence::BitwiseAnd),
        Token::EqualEqual => (InfixOperator::Binary(B::Equal), Precedence::Equality),
        Token::BangEqual => (InfixOperator::Binary(B::NotEqual), Precedence::Equality),
        Token::EqualEqualEqual => (InfixOperator::Binary(B::StrictEqual), Precedence::Equality),
        Token::BangEqualEqual => (InfixOperator::Binary(B::StrictNotEqual), Precedence::Equality),
        Token::Less => (InfixOperator::Binary(B::LessThan), Precedence::Relational),
        Token::LessEqual => (InfixOperator::Binary(B::LessEqual), Precedence::Relational),
        Token::Greater => (InfixOperator::Binary(B::GreaterThan), Precedence::Relational),
        Token::GreaterEqual => (InfixOperator::Binary(B::GreaterEqual), Precedence::Relational),
        Token::Instanceof => (InfixOperator::Binary(B::Instanceof), Precedence::Relational),
        Token::In if allow_in => (InfixOperator::Binary(B::In), Precedence::Relational),
        Token::LessLess => (InfixOperator::Binary(B::LeftShift), Precedence::Shift),
        Token::GreaterGreater => (InfixOperator::Binary(B::RightShift), Precedence::Shift),
        Token::GreaterGreaterGreater => {
            (InfixOperator::Binary(B::UnsignedRightShift), Precedence::Shift)
        }
        Token::Plus => (InfixOperator::Binary(B::Add), Precedence::Additive),
        Token::Minus => (InfixOperator::Binary(B::Subtract), Precedence::Additive),
        Token::Star => (InfixOperator::Binary(B::Multiply), Precedence::Multiplicative),
        Token::Slash => (InfixOperator::Binary(B::Divide), Precedence::Multiplicative),
        Token::Percent => (InfixOperator::Binary(B::Modulo), Precedence::Multiplicative),
        _ => return None,
    };
    Some((op, prec))
}

/// Precedence of an operator when printed, matching [`infix_operator`].
pub fn binary_precedence(op: BinaryOperator) -> Precedence {
    use BinaryOperator as B;
    match op {
        B::BitwiseOr => Precedence::BitwiseOr,
        B::BitwiseXor => Precedence::BitwiseXor,
        B::BitwiseAnd => Precedence::BitwiseAnd,
        B::Equal | B::NotEqual | B::StrictEqual | B::StrictNotEqual => Precedence::Equality,
        B::LessThan
        | B::LessEqual
        | B::GreaterThan
        | B::GreaterEqual
        | B::In
        | B::Instanceof => Precedence::Relational,
        B::LeftShift | B::RightShift | B::UnsignedRightShift => Precedence::Shift,
        B::Add | B::Subtract => Precedence::Additive,
        B::Multiply | B::Divide | B::Modulo => Precedence::Multiplicative,
    }
}

pub fn logical_precedence(op: LogicalOperator) -> Precedence {
    match op {
        LogicalOperator::Or => Precedence::LogicalOr,
        LogicalOperator::And => Precedence::LogicalAnd,
    }
}
