use chrono::NaiveDateTime;
use rec_ast::{BinaryOperator, Expr, Literal, UnaryOperator};
use rec_core::Record;
use regex::RegexBuilder;

/// A dynamically-typed selection-expression value.
///
/// Fields are always lexically strings, but operators coerce them to
/// integers, reals or booleans depending on the operator and the operand
/// shapes, per the coercion rules in the design.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A string value (the raw value of a field, or a string literal/concat result).
    Str(String),
    /// An integer value (a literal, a `#field` count, or an arithmetic result).
    Int(i64),
    /// A real-number value (a literal, or an arithmetic result promoted to real).
    Real(f64),
    /// A boolean value, produced by comparisons and logical operators.
    Bool(bool),
}

impl Value {
    /// Renders the value as a string for concatenation and display purposes.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            Value::Int(n) => n.to_string(),
            Value::Real(r) => r.to_string(),
            Value::Bool(b) => {
                if *b {
                    "1".to_string()
                } else {
                    "0".to_string()
                }
            }
        }
    }

    /// The truthiness rule used by logical operators and top-level evaluation:
    /// truthy iff a non-empty string or a non-zero number.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Str(s) => !s.is_empty(),
            Value::Int(n) => *n != 0,
            Value::Real(r) => *r != 0.0,
            Value::Bool(b) => *b,
        }
    }

    fn as_number(&self) -> Number {
        match self {
            Value::Int(n) => Number::Int(*n),
            Value::Real(r) => Number::Real(*r),
            Value::Bool(b) => Number::Int(if *b { 1 } else { 0 }),
            Value::Str(s) => parse_number_lenient(s),
        }
    }

    fn parses_as_number(&self) -> bool {
        match self {
            Value::Int(_) | Value::Real(_) | Value::Bool(_) => true,
            Value::Str(s) => try_parse_number(s).is_some(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum Number {
    Int(i64),
    Real(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Real(r) => r,
        }
    }
}

/// Attempts to parse `s` as an integer (decimal, `0x` hex, or leading-zero
/// octal) or else as a real number, returning `None` if neither succeeds.
fn try_parse_number(s: &str) -> Option<Number> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let apply_sign_i = |n: i64| if negative { -n } else { n };
    let apply_sign_f = |n: f64| if negative { -n } else { n };

    if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16)
            .ok()
            .map(|n| Number::Int(apply_sign_i(n)));
    }
    if digits.len() > 1 && digits.starts_with('0') && digits.chars().all(|c| c.is_ascii_digit()) {
        return i64::from_str_radix(digits, 8)
            .ok()
            .map(|n| Number::Int(apply_sign_i(n)));
    }
    if let Ok(n) = digits.parse::<i64>() {
        return Some(Number::Int(apply_sign_i(n)));
    }
    if let Ok(r) = digits.parse::<f64>() {
        return Some(Number::Real(apply_sign_f(r)));
    }
    None
}

fn parse_number_lenient(s: &str) -> Number {
    try_parse_number(s).unwrap_or(Number::Int(0))
}

fn arith(op: BinaryOperator, left: Number, right: Number) -> Value {
    match (left, right) {
        (Number::Int(a), Number::Int(b)) => match op {
            BinaryOperator::Add => Value::Int(a.wrapping_add(b)),
            BinaryOperator::Sub => Value::Int(a.wrapping_sub(b)),
            BinaryOperator::Mul => Value::Int(a.wrapping_mul(b)),
            BinaryOperator::Div => Value::Int(if b == 0 { 0 } else { a / b }),
            BinaryOperator::Mod => Value::Int(if b == 0 { 0 } else { a % b }),
            _ => unreachable!("arith called with non-arithmetic operator"),
        },
        _ => {
            let a = left.as_f64();
            let b = right.as_f64();
            match op {
                BinaryOperator::Add => Value::Real(a + b),
                BinaryOperator::Sub => Value::Real(a - b),
                BinaryOperator::Mul => Value::Real(a * b),
                BinaryOperator::Div => Value::Real(if b == 0.0 { 0.0 } else { a / b }),
                BinaryOperator::Mod => Value::Real(if b == 0.0 { 0.0 } else { a % b }),
                _ => unreachable!("arith called with non-arithmetic operator"),
            }
        }
    }
}

fn compare(op: BinaryOperator, left: Number, right: Number) -> bool {
    let ordering = match (left, right) {
        (Number::Int(a), Number::Int(b)) => a.partial_cmp(&b),
        _ => left.as_f64().partial_cmp(&right.as_f64()),
    };
    let ordering = match ordering {
        Some(o) => o,
        None => return false,
    };
    match op {
        BinaryOperator::Less => ordering.is_lt(),
        BinaryOperator::LessEqual => ordering.is_le(),
        BinaryOperator::Greater => ordering.is_gt(),
        BinaryOperator::GreaterEqual => ordering.is_ge(),
        _ => unreachable!("compare called with non-ordering operator"),
    }
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d",
    "%Y/%m/%d",
];

fn try_parse_date(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    for format in DATE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
        if let Ok(date) = chrono::NaiveDate::parse_from_str(trimmed, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Evaluation context: the record a selection expression is being evaluated
/// against, and whether string/regex comparisons are case-insensitive.
pub struct EvalContext<'a> {
    /// The record field references resolve against.
    pub record: &'a Record,
    /// Whether `~` and quick-search comparisons ignore case.
    pub case_insensitive: bool,
}

impl<'a> EvalContext<'a> {
    /// Creates a new evaluation context.
    pub fn new(record: &'a Record) -> Self {
        Self {
            record,
            case_insensitive: false,
        }
    }

    /// Sets the case-sensitivity flag.
    pub fn with_case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }
}

/// Evaluates `expr` against `ctx`, returning its dynamically-typed result.
///
/// This function never fails: unparseable numbers coerce to `0`, unparseable
/// dates make date comparisons evaluate to `false`, and a malformed regex
/// pattern likewise evaluates to `false`, per the language's runtime-error
/// tolerant failure model.
pub fn eval(expr: &Expr, ctx: &EvalContext<'_>) -> Value {
    match expr {
        Expr::Literal(Literal::Int(n)) => Value::Int(*n),
        Expr::Literal(Literal::Real(r)) => Value::Real(*r),
        Expr::Literal(Literal::Str(s)) => Value::Str(s.clone()),
        Expr::Field { name, index } => eval_field(name, index.as_deref(), ctx),
        Expr::Count(inner) => Value::Int(eval_count(inner, ctx)),
        Expr::Unary { op, expr } => eval_unary(*op, expr, ctx),
        Expr::Binary { left, op, right } => eval_binary(*op, left, right, ctx),
        Expr::Ternary {
            cond,
            then_branch,
            else_branch,
        } => {
            if eval(cond, ctx).is_truthy() {
                eval(then_branch, ctx)
            } else {
                eval(else_branch, ctx)
            }
        }
    }
}

/// Evaluates `expr` and coerces the result to a boolean via the truthiness
/// rule. This is the entry point used by the integrity checker's
/// `%constraint` directive and the selector pipeline's `-e` filter.
pub fn eval_bool(expr: &Expr, ctx: &EvalContext<'_>) -> bool {
    eval(expr, ctx).is_truthy()
}

fn eval_field(name: &str, index: &Option<Box<Expr>>, ctx: &EvalContext<'_>) -> Value {
    match index {
        None => Value::Str(ctx.record.get_field(name).unwrap_or("").to_string()),
        Some(index_expr) => {
            let idx = eval(index_expr, ctx).as_number();
            let idx = match idx {
                Number::Int(n) if n >= 0 => n as usize,
                Number::Real(r) if r >= 0.0 => r as usize,
                _ => return Value::Str(String::new()),
            };
            Value::Str(
                ctx.record
                    .get_field_at(name, idx)
                    .unwrap_or("")
                    .to_string(),
            )
        }
    }
}

fn eval_count(expr: &Expr, ctx: &EvalContext<'_>) -> i64 {
    match expr {
        Expr::Field { name, .. } => ctx.record.get_field_count(name) as i64,
        other => {
            if eval(other, ctx).is_truthy() {
                1
            } else {
                0
            }
        }
    }
}

fn eval_unary(op: UnaryOperator, expr: &Expr, ctx: &EvalContext<'_>) -> Value {
    let value = eval(expr, ctx);
    match op {
        UnaryOperator::Neg => match value.as_number() {
            Number::Int(n) => Value::Int(-n),
            Number::Real(r) => Value::Real(-r),
        },
        UnaryOperator::Not => Value::Bool(!value.is_truthy()),
    }
}

fn eval_binary(op: BinaryOperator, left: &Expr, right: &Expr, ctx: &EvalContext<'_>) -> Value {
    match op {
        BinaryOperator::And => {
            let l = eval(left, ctx);
            if !l.is_truthy() {
                return Value::Bool(false);
            }
            Value::Bool(eval(right, ctx).is_truthy())
        }
        BinaryOperator::Or => {
            let l = eval(left, ctx);
            if l.is_truthy() {
                return Value::Bool(true);
            }
            Value::Bool(eval(right, ctx).is_truthy())
        }
        BinaryOperator::Implies => {
            let l = eval(left, ctx);
            if !l.is_truthy() {
                return Value::Bool(true);
            }
            Value::Bool(eval(right, ctx).is_truthy())
        }
        BinaryOperator::Equal | BinaryOperator::NotEqual => {
            let l = eval(left, ctx);
            let r = eval(right, ctx);
            let equal = if l.parses_as_number() || r.parses_as_number() {
                numbers_equal(l.as_number(), r.as_number())
            } else {
                l.to_display_string() == r.to_display_string()
            };
            Value::Bool(if op == BinaryOperator::Equal {
                equal
            } else {
                !equal
            })
        }
        BinaryOperator::Less
        | BinaryOperator::LessEqual
        | BinaryOperator::Greater
        | BinaryOperator::GreaterEqual => {
            let l = eval(left, ctx).as_number();
            let r = eval(right, ctx).as_number();
            Value::Bool(compare(op, l, r))
        }
        BinaryOperator::DateBefore | BinaryOperator::DateAfter => {
            let l = eval(left, ctx).to_display_string();
            let r = eval(right, ctx).to_display_string();
            match (try_parse_date(&l), try_parse_date(&r)) {
                (Some(a), Some(b)) => Value::Bool(if op == BinaryOperator::DateBefore {
                    a < b
                } else {
                    a > b
                }),
                _ => Value::Bool(false),
            }
        }
        BinaryOperator::Match => {
            let l = eval(left, ctx).to_display_string();
            let pattern = eval(right, ctx).to_display_string();
            let compiled = RegexBuilder::new(&pattern)
                .case_insensitive(ctx.case_insensitive)
                .build();
            Value::Bool(compiled.map(|re| re.is_match(&l)).unwrap_or(false))
        }
        BinaryOperator::Concat => {
            let l = eval(left, ctx).to_display_string();
            let r = eval(right, ctx).to_display_string();
            Value::Str(l + &r)
        }
        BinaryOperator::Add
        | BinaryOperator::Sub
        | BinaryOperator::Mul
        | BinaryOperator::Div
        | BinaryOperator::Mod => {
            let l = eval(left, ctx).as_number();
            let r = eval(right, ctx).as_number();
            arith(op, l, r)
        }
    }
}

fn numbers_equal(a: Number, b: Number) -> bool {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => x == y,
        _ => a.as_f64() == b.as_f64(),
    }
}
