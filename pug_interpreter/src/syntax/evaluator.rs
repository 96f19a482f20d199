//! Fused recursive-descent parser and evaluator.
//!
//! Tokens are executed as they are parsed; no tree is built. Untaken
//! branches are passed over with [`TokenStream::skip_block`] and loops
//! rewind the cursor to re-test their condition.
//!
//! Precedence, loosest first: `||`, `&&`, comparison, additive
//! (`+ - %`), multiplicative (`* /`), unary sign, primary. Every binary
//! tier is left-associative.

use super::error::{EvalError, EvalErrorKind};
use crate::config::compile_time::runtime::MAX_STRING_LENGTH;
use crate::config::compile_time::syntax::{MAX_CALL_ARGUMENTS, MAX_PARSE_DEPTH};
use crate::config::runtime::EvaluatorPreferences;
use crate::logging::codes;
use crate::runtime::{
    format_double, BuiltInFunctions, DataType, Host, RuntimeValue, ValueError, VariableTable,
    EQUALITY_EPSILON,
};
use crate::tokens::{Token, TokenKind, TokenStream};
use crate::{log_debug, log_error, log_success};

/// A failure before the evaluator's state is attached
#[derive(Debug)]
struct Failure {
    kind: EvalErrorKind,
    token: Token,
}

impl Failure {
    fn at(kind: impl Into<EvalErrorKind>, token: &Token) -> Self {
        Self {
            kind: kind.into(),
            token: token.clone(),
        }
    }
}

type Eval<T> = Result<T, Failure>;

pub struct Evaluator<'t, 'v, 'h> {
    stream: TokenStream<'t>,
    variables: &'v mut VariableTable,
    host: &'h mut dyn Host,
    preferences: EvaluatorPreferences,
    depth: usize,
}

impl<'t, 'v, 'h> Evaluator<'t, 'v, 'h> {
    pub fn new(
        tokens: &'t [Token],
        variables: &'v mut VariableTable,
        host: &'h mut dyn Host,
    ) -> Self {
        Self::with_preferences(tokens, variables, host, EvaluatorPreferences::default())
    }

    pub fn with_preferences(
        tokens: &'t [Token],
        variables: &'v mut VariableTable,
        host: &'h mut dyn Host,
        preferences: EvaluatorPreferences,
    ) -> Self {
        Self {
            stream: TokenStream::new(tokens),
            variables,
            host,
            preferences,
            depth: 0,
        }
    }

    /// Evaluate statements until end of input, returning each statement's
    /// value in order. `None` values are kept.
    pub fn run(mut self) -> Result<Vec<RuntimeValue>, EvalError> {
        log_debug!("Starting evaluation",
            "tokens" => self.stream.len(),
            "variables" => self.variables.len()
        );

        let mut values = Vec::new();
        while !self.stream.is_at_end() {
            match self.expression() {
                Ok(value) => {
                    if self.preferences.trace_statements {
                        log_debug!("Statement evaluated",
                            "data_type" => value.data_type(),
                            "value" => &value
                        );
                    }
                    values.push(value);
                }
                Err(failure) => return Err(self.into_error(failure, values)),
            }
        }

        log_success!(
            codes::success::EVALUATION_COMPLETE,
            "Evaluation completed",
            "statements" => values.len(),
            "variables" => self.variables.len()
        );

        Ok(values)
    }

    fn into_error(self, failure: Failure, values: Vec<RuntimeValue>) -> EvalError {
        let error = EvalError::new(
            failure.kind,
            failure.token,
            self.stream.tokens().to_vec(),
            self.variables.clone(),
            values,
        );
        log_error!(error.error_code(), &error.to_string(),
            "token" => error.token(),
            "statements_completed" => error.values().len()
        );
        error
    }

    fn fail(&self, kind: impl Into<EvalErrorKind>) -> Failure {
        Failure::at(kind, self.stream.current())
    }

    fn expect(&mut self, kind: TokenKind) -> Eval<Token> {
        self.stream.expect(kind).map_err(|found| {
            Failure::at(
                EvalErrorKind::UnexpectedToken {
                    found: found.kind,
                    expected: kind,
                },
                &found,
            )
        })
    }

    fn expression(&mut self) -> Eval<RuntimeValue> {
        self.logical_or()
    }

    fn logical_or(&mut self) -> Eval<RuntimeValue> {
        let mut left = self.logical_and()?;
        while self.stream.check(TokenKind::Or) {
            let operator = self.stream.advance().clone();
            let right = self.logical_and()?;
            left = logical(&left, &right, operator.kind).map_err(|e| Failure::at(e, &operator))?;
        }
        Ok(left)
    }

    fn logical_and(&mut self) -> Eval<RuntimeValue> {
        let mut left = self.comparison()?;
        while self.stream.check(TokenKind::And) {
            let operator = self.stream.advance().clone();
            let right = self.comparison()?;
            left = logical(&left, &right, operator.kind).map_err(|e| Failure::at(e, &operator))?;
        }
        Ok(left)
    }

    fn comparison(&mut self) -> Eval<RuntimeValue> {
        let mut left = self.additive()?;
        while self.stream.current_kind().is_comparison() {
            let operator = self.stream.advance().clone();
            let right = self.additive()?;
            left = compare(&left, &right, operator.kind).map_err(|e| Failure::at(e, &operator))?;
        }
        Ok(left)
    }

    fn additive(&mut self) -> Eval<RuntimeValue> {
        let mut left = self.multiplicative()?;
        while matches!(
            self.stream.current_kind(),
            TokenKind::Plus | TokenKind::Minus | TokenKind::Remainder
        ) {
            let operator = self.stream.advance().clone();
            let right = self.multiplicative()?;
            left = arithmetic(&left, &right, operator.kind)
                .map_err(|e| Failure::at(e, &operator))?;
        }
        Ok(left)
    }

    fn multiplicative(&mut self) -> Eval<RuntimeValue> {
        let mut left = self.unary()?;
        while matches!(
            self.stream.current_kind(),
            TokenKind::Multiply | TokenKind::Divide
        ) {
            let operator = self.stream.advance().clone();
            let right = self.unary()?;
            left = arithmetic(&left, &right, operator.kind)
                .map_err(|e| Failure::at(e, &operator))?;
        }
        Ok(left)
    }

    /// Every nested expression passes through here, so this is where
    /// nesting depth is bounded.
    fn unary(&mut self) -> Eval<RuntimeValue> {
        if self.depth >= MAX_PARSE_DEPTH {
            return Err(self.fail(EvalErrorKind::MaxDepthExceeded {
                limit: MAX_PARSE_DEPTH,
            }));
        }

        self.depth += 1;
        let result = match self.stream.current_kind() {
            TokenKind::Plus | TokenKind::Minus => {
                let sign = self.stream.advance().clone();
                self.unary().and_then(|operand| {
                    apply_sign(&operand, sign.kind).map_err(|e| Failure::at(e, &sign))
                })
            }
            _ => self.primary(),
        };
        self.depth -= 1;
        result
    }

    fn primary(&mut self) -> Eval<RuntimeValue> {
        let token = self.stream.current().clone();
        match token.kind {
            TokenKind::DataType => self.declaration(),
            TokenKind::Identifier => self.identifier(),
            TokenKind::Function => self.call(),
            TokenKind::Number | TokenKind::String | TokenKind::Bool => {
                self.stream.advance();
                RuntimeValue::from_literal_token(&token).map_err(|e| Failure::at(e, &token))
            }
            TokenKind::OpenParenthesis => {
                self.stream.advance();
                let value = self.expression()?;
                self.expect(TokenKind::CloseParenthesis)?;
                Ok(value)
            }
            TokenKind::If => self.if_block(),
            TokenKind::While => self.while_block(),
            kind => Err(Failure::at(
                EvalErrorKind::UnexpectedPrimary {
                    kind,
                    offset: token.offset,
                },
                &token,
            )),
        }
    }

    /// `<type> <name> [= <expr>]`. The name is bound to the type's zero
    /// value before the initializer runs.
    fn declaration(&mut self) -> Eval<RuntimeValue> {
        let type_token = self.stream.advance().clone();
        let data_type = DataType::from_name(&type_token.text).ok_or_else(|| {
            Failure::at(
                ValueError::UnknownType {
                    name: type_token.text.clone(),
                },
                &type_token,
            )
        })?;

        let has_initializer = self.stream.peek().is(TokenKind::Assign);
        let name = self.expect(TokenKind::Identifier)?;
        self.variables
            .declare(&name.text, RuntimeValue::default_for(data_type));

        if !has_initializer {
            return Ok(RuntimeValue::None);
        }

        self.expect(TokenKind::Assign)?;
        let value = self.expression()?;
        let value = value.cast(data_type).map_err(|e| self.fail(e))?;
        self.variables.declare(&name.text, value.clone());
        Ok(value)
    }

    /// Variable read, or assignment when the name is followed by `=`
    fn identifier(&mut self) -> Eval<RuntimeValue> {
        let name = self.stream.advance().clone();
        let unknown = |name: &Token| {
            Failure::at(
                EvalErrorKind::UnknownIdentifier {
                    name: name.text.clone(),
                },
                name,
            )
        };

        if self.stream.advance_if(TokenKind::Assign) {
            let value = self.expression()?;
            if !self.variables.assign(&name.text, value.clone()) {
                return Err(unknown(&name));
            }
            return Ok(value);
        }

        self.variables
            .get(&name.text)
            .cloned()
            .ok_or_else(|| unknown(&name))
    }

    fn call(&mut self) -> Eval<RuntimeValue> {
        let function = self.stream.advance().clone();
        self.expect(TokenKind::OpenParenthesis)?;

        let mut args = Vec::new();
        if !self.stream.check(TokenKind::CloseParenthesis) {
            args.push(self.expression()?);
            while self.stream.advance_if(TokenKind::Comma) {
                if args.len() >= MAX_CALL_ARGUMENTS {
                    return Err(Failure::at(
                        EvalErrorKind::TooManyArguments {
                            name: function.text.clone(),
                            limit: MAX_CALL_ARGUMENTS,
                        },
                        &function,
                    ));
                }
                args.push(self.expression()?);
            }
        }
        self.expect(TokenKind::CloseParenthesis)?;

        BuiltInFunctions::invoke(&function.text, &args, &mut *self.host)
            .map_err(|e| Failure::at(e, &function))
    }

    /// `if <cond> <block> [else <block>] end`. The value is the condition.
    fn if_block(&mut self) -> Eval<RuntimeValue> {
        let keyword = self.stream.advance().clone();
        let condition = self.condition()?;

        if condition {
            if self.block(&keyword, &[TokenKind::Else, TokenKind::End])? == TokenKind::Else {
                self.stream.advance();
                self.skip(&keyword, &[TokenKind::End])?;
            }
        } else if self.skip(&keyword, &[TokenKind::Else, TokenKind::End])? == TokenKind::Else {
            self.stream.advance();
            self.block(&keyword, &[TokenKind::End])?;
        }

        self.expect(TokenKind::End)?;
        Ok(RuntimeValue::Bool(condition))
    }

    /// `while <cond> <block> end`. Produces `None`.
    fn while_block(&mut self) -> Eval<RuntimeValue> {
        let keyword = self.stream.advance().clone();
        let condition_start = self.stream.position();
        let limit = self.preferences.max_loop_iterations;
        let mut iterations: u64 = 0;

        while self.condition()? {
            iterations += 1;
            if limit > 0 && iterations > limit {
                return Err(Failure::at(
                    EvalErrorKind::LoopLimitExceeded { limit },
                    &keyword,
                ));
            }
            self.block(&keyword, &[TokenKind::End])?;
            self.stream.set_position(condition_start);
        }

        if self.skip(&keyword, &[TokenKind::Else, TokenKind::End])? == TokenKind::Else {
            return Err(self.fail(EvalErrorKind::ElseInWhile));
        }
        self.expect(TokenKind::End)?;

        log_debug!("Loop finished", "iterations" => iterations, "offset" => keyword.offset);
        Ok(RuntimeValue::None)
    }

    fn condition(&mut self) -> Eval<bool> {
        let value = self.expression()?;
        value.to_bool().map_err(|e| self.fail(e))
    }

    /// Evaluate statements until one of `stops` at this level, leaving the
    /// cursor on it. Statement values inside blocks are discarded.
    fn block(&mut self, keyword: &Token, stops: &[TokenKind]) -> Eval<TokenKind> {
        loop {
            let kind = self.stream.current_kind();
            if stops.contains(&kind) {
                return Ok(kind);
            }
            match kind {
                TokenKind::EndOfInput => return Err(self.unterminated(keyword)),
                TokenKind::Else if keyword.is(TokenKind::While) => {
                    return Err(self.fail(EvalErrorKind::ElseInWhile))
                }
                _ => {
                    self.expression()?;
                }
            }
        }
    }

    fn skip(&mut self, keyword: &Token, stops: &[TokenKind]) -> Eval<TokenKind> {
        match self.stream.skip_block(stops) {
            Some(kind) => Ok(kind),
            None => Err(self.unterminated(keyword)),
        }
    }

    fn unterminated(&self, keyword: &Token) -> Failure {
        let keyword = match keyword.kind {
            TokenKind::While => "while",
            _ => "if",
        };
        self.fail(EvalErrorKind::UnterminatedBlock { keyword })
    }
}

/// Unary `+`/`-`. The operand keeps its type; strings hold the negated
/// number as text.
fn apply_sign(operand: &RuntimeValue, sign: TokenKind) -> Result<RuntimeValue, EvalErrorKind> {
    let negate = sign == TokenKind::Minus;
    match operand {
        RuntimeValue::None => Err(ValueError::NoneOperand { operator: sign }.into()),
        RuntimeValue::Int(value) => Ok(RuntimeValue::Int(if negate {
            value.saturating_neg()
        } else {
            *value
        })),
        other => {
            let magnitude = other.to_double()?;
            let value = if negate { -magnitude } else { magnitude };
            Ok(match other.data_type() {
                DataType::String => RuntimeValue::Str(format_double(value)),
                _ => RuntimeValue::Double(value),
            })
        }
    }
}

/// `+ - * / %`. A String on either side selects string semantics;
/// numeric results are always Double.
fn arithmetic(
    left: &RuntimeValue,
    right: &RuntimeValue,
    operator: TokenKind,
) -> Result<RuntimeValue, EvalErrorKind> {
    if left.is_none() || right.is_none() {
        return Err(ValueError::NoneOperand { operator }.into());
    }

    if left.data_type() == DataType::String || right.data_type() == DataType::String {
        return string_operation(left, right, operator);
    }

    if left.is_number() && right.is_number() {
        let (l, r) = (left.to_double()?, right.to_double()?);
        let value = match operator {
            TokenKind::Plus => l + r,
            TokenKind::Minus => l - r,
            TokenKind::Multiply => l * r,
            TokenKind::Divide => l / r,
            TokenKind::Remainder => l % r,
            _ => return Err(EvalErrorKind::UnsupportedOperator { operator }),
        };
        return Ok(RuntimeValue::Double(value));
    }

    Err(EvalErrorKind::UnsupportedOperator { operator })
}

fn string_operation(
    left: &RuntimeValue,
    right: &RuntimeValue,
    operator: TokenKind,
) -> Result<RuntimeValue, EvalErrorKind> {
    let text = match operator {
        TokenKind::Plus => format!("{}{}", left, right),
        TokenKind::Minus => {
            let removed = right.to_string();
            if removed.is_empty() {
                left.to_string()
            } else {
                left.to_string().replace(&removed, "")
            }
        }
        TokenKind::Multiply => return repeat(left, right),
        _ => return Err(EvalErrorKind::UnsupportedOperator { operator }),
    };
    Ok(RuntimeValue::checked_str(text)?)
}

/// String repetition in either operand order. Negative counts give "".
fn repeat(left: &RuntimeValue, right: &RuntimeValue) -> Result<RuntimeValue, EvalErrorKind> {
    let (text, count) = if left.data_type() == DataType::String {
        (left.to_string(), right.to_int()?)
    } else {
        (right.to_string(), left.to_int()?)
    };

    let count = usize::try_from(count).unwrap_or(0);
    let length = text.chars().count().saturating_mul(count);
    if length > MAX_STRING_LENGTH {
        return Err(ValueError::StringTooLong { length }.into());
    }
    Ok(RuntimeValue::Str(text.repeat(count)))
}

fn compare(
    left: &RuntimeValue,
    right: &RuntimeValue,
    operator: TokenKind,
) -> Result<RuntimeValue, EvalErrorKind> {
    RuntimeValue::ensure_same_types(left, right, operator)?;

    let result = match operator {
        TokenKind::Equal => equal(left, right)?,
        TokenKind::NotEqual => !equal(left, right)?,
        TokenKind::Greater => greater(left, right)?,
        TokenKind::GreaterOrEqual => greater(left, right)? || equal(left, right)?,
        TokenKind::Less => greater(right, left)?,
        TokenKind::LessOrEqual => greater(right, left)? || equal(left, right)?,
        _ => return Err(EvalErrorKind::UnsupportedOperator { operator }),
    };
    Ok(RuntimeValue::Bool(result))
}

/// Doubles compare within `EQUALITY_EPSILON`; everything else is exact
fn equal(left: &RuntimeValue, right: &RuntimeValue) -> Result<bool, ValueError> {
    match (left, right) {
        (RuntimeValue::Str(a), RuntimeValue::Str(b)) => Ok(a == b),
        (RuntimeValue::Bool(a), RuntimeValue::Bool(b)) => Ok(a == b),
        (RuntimeValue::Int(a), RuntimeValue::Int(b)) => Ok(a == b),
        _ => Ok((left.to_double()? - right.to_double()?).abs() < EQUALITY_EPSILON),
    }
}

/// Ordering goes through doubles when either side is a Double and
/// through integers otherwise, so non-numeric strings fail to convert.
fn greater(left: &RuntimeValue, right: &RuntimeValue) -> Result<bool, ValueError> {
    if left.data_type() == DataType::Double || right.data_type() == DataType::Double {
        Ok(left.to_double()? > right.to_double()?)
    } else {
        Ok(left.to_int()? > right.to_int()?)
    }
}

fn logical(
    left: &RuntimeValue,
    right: &RuntimeValue,
    operator: TokenKind,
) -> Result<RuntimeValue, EvalErrorKind> {
    match (left, right) {
        (RuntimeValue::Bool(a), RuntimeValue::Bool(b)) => match operator {
            TokenKind::And => Ok(RuntimeValue::Bool(*a && *b)),
            TokenKind::Or => Ok(RuntimeValue::Bool(*a || *b)),
            _ => Err(EvalErrorKind::UnsupportedOperator { operator }),
        },
        _ => Err(EvalErrorKind::NonBooleanLogicalOperand { operator }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize;
    use crate::runtime::MemoryHost;
    use crate::syntax::{evaluate, evaluate_with_preferences};
    use assert_matches::assert_matches;

    fn run_with(variables: &mut VariableTable, source: &str) -> Result<Vec<RuntimeValue>, EvalError> {
        let tokens = tokenize(source).unwrap();
        evaluate(variables, &tokens, &mut MemoryHost::with_seed(1))
    }

    fn run(source: &str) -> Result<Vec<RuntimeValue>, EvalError> {
        run_with(&mut VariableTable::new(), source)
    }

    fn first(source: &str) -> String {
        run(source).unwrap()[0].to_string()
    }

    fn message(source: &str) -> String {
        run(source).unwrap_err().to_string()
    }

    fn names_and_values(variables: &VariableTable) -> Vec<(String, String)> {
        variables
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn test_arithmetic_and_precedence() {
        let cases = [
            ("1 + 2 * 3", "7"),
            ("(1 + 2) * 3", "9"),
            ("10 - 4 - 3", "3"),
            ("7 / 2", "3.5"),
            ("7 % 3", "1"),
            ("2 * 3 % 4", "2"),
            ("-(2 + 3)", "-5"),
            ("- -4", "4"),
        ];
        for (source, expected) in cases {
            assert_eq!(first(source), expected, "source: {}", source);
        }
    }

    #[test]
    fn test_numeric_results_are_double() {
        let mut variables = VariableTable::new();
        let values = run_with(&mut variables, "int a = 2 int b = 3 a + b").unwrap();
        assert_eq!(values[2], RuntimeValue::Double(5.0));
    }

    #[test]
    fn test_sqrt_of_negative_is_nan() {
        let values = run("sqrt(-1)").unwrap();
        assert_eq!(values.len(), 1);
        assert_matches!(values[0], RuntimeValue::Double(v) if v.is_nan());
        assert_eq!(first("sqrt(-1)"), "NaN");
    }

    #[test]
    fn test_string_operations() {
        let cases = [
            ("\"A\" * 3", "AAA"),
            ("3 * \"A\"", "AAA"),
            ("\"A\" * -2", ""),
            ("\"A\" + 3", "A3"),
            ("3 + \"A\" // trailing comment", "3A"),
            ("\"banana\" - \"a\"", "bnn"),
            ("\"a\" + 1 + \"b\"", "a1b"),
            ("string texto = \"Esse texto tem // barras\"", "Esse texto tem // barras"),
        ];
        for (source, expected) in cases {
            assert_eq!(first(source), expected, "source: {}", source);
        }
        assert_eq!(message("\"a\" / 2"), "Unexpected token: Divide");
        assert_eq!(message("true + 1"), "Unexpected token: Plus");
    }

    #[test]
    fn test_comparisons() {
        let cases = [
            ("1 == 1", "true"),
            ("1 != 2", "true"),
            ("1.001 == 1", "true"),
            ("1.5 == 1", "false"),
            ("3 > 2", "true"),
            ("4 >= 4", "true"),
            ("5 < 10", "true"),
            ("7 <= 7", "true"),
            ("1 == (2*3)", "false"),
            ("4 == pow(2)", "true"),
            ("3 == pow(2) - 1", "true"),
            ("\"a\" == \"a\"", "true"),
            ("\"a\" != \"b\"", "true"),
            ("true == true", "true"),
            ("false != false", "false"),
            ("len(\"pug\") == 3", "true"),
            ("round(2.49) == 2", "true"),
            ("round(2.51) == 2", "false"),
        ];
        for (source, expected) in cases {
            assert_eq!(first(source), expected, "source: {}", source);
        }
    }

    #[test]
    fn test_int_comparison_is_exact() {
        let values = run("int a = 1 int b = 2 a < b a == b").unwrap();
        assert_eq!(values[2], RuntimeValue::Bool(true));
        assert_eq!(values[3], RuntimeValue::Bool(false));
    }

    #[test]
    fn test_logical_operators() {
        let cases = [
            ("true && true", "true"),
            ("true && false", "false"),
            ("false || true", "true"),
            ("false || false", "false"),
            ("(2 < 3) && (4 > 1)", "true"),
            ("pow(2)  == 4 && min (3, 2) == 2", "true"),
            ("min(8,3) == 8 || max(1,7) == 10", "false"),
            ("upper(\"dog\") == \"DOG\" && lower(\"CAT\") == \"cat\"", "true"),
            ("round(2.51) == 3 && len(\"pug\") == 4", "false"),
            ("true || false && false", "true"),
        ];
        for (source, expected) in cases {
            let values = run(source).unwrap();
            assert_eq!(values.len(), 1, "source: {}", source);
            assert_eq!(values[0].to_string(), expected, "source: {}", source);
        }
        assert_eq!(
            message("1 && true"),
            "Logical operator And can only be applied to bool types"
        );
    }

    #[test]
    fn test_declarations() {
        let mut variables = VariableTable::new();
        let values = run_with(
            &mut variables,
            "int b string c bool d double e int x = 10 double y = 3 int z = 2.5",
        )
        .unwrap();

        assert_eq!(
            values,
            vec![
                RuntimeValue::None,
                RuntimeValue::None,
                RuntimeValue::None,
                RuntimeValue::None,
                RuntimeValue::Int(10),
                RuntimeValue::Double(3.0),
                RuntimeValue::Int(2),
            ]
        );
        assert_eq!(variables.get("b"), Some(&RuntimeValue::Int(0)));
        assert_eq!(variables.get("c"), Some(&RuntimeValue::Str(String::new())));
        assert_eq!(variables.get("d"), Some(&RuntimeValue::Bool(false)));
        assert_eq!(variables.get("e"), Some(&RuntimeValue::Double(0.0)));
    }

    #[test]
    fn test_assignment_stores_value_as_is() {
        let mut variables = VariableTable::new();
        let values = run_with(&mut variables, "int idade idade = idade + 1").unwrap();
        assert_eq!(values[1], RuntimeValue::Double(1.0));
        assert_eq!(variables.get("idade"), Some(&RuntimeValue::Double(1.0)));
    }

    #[test]
    fn test_redeclaration_overwrites() {
        let mut variables = VariableTable::new();
        run_with(&mut variables, "int a = 1 string a = \"x\"").unwrap();
        assert_eq!(variables.len(), 1);
        assert_eq!(variables.get("a"), Some(&RuntimeValue::Str("x".to_string())));
    }

    #[test]
    fn test_table_persists_across_calls() {
        let mut variables = VariableTable::new();
        run_with(&mut variables, "string nome = \"Angelo\"").unwrap();
        let values = run_with(&mut variables, "nome = nome + \" Belchior\"").unwrap();
        assert_eq!(values[0].to_string(), "Angelo Belchior");
    }

    #[test]
    fn test_error_messages() {
        let cases = [
            ("y = 1", "Unknown identifier: y"),
            ("xpto(abc)", "Unknown identifier: xpto"),
            ("sqrt()", "Invalid number of arguments for sqrt"),
            ("sqrt(1,3)", "Invalid number of arguments for sqrt"),
            ("sqrt(\"xxx\")", "Can't convert xxx to double"),
            ("pow(1,2,3)", "Invalid number of arguments for pow"),
            ("min(\"xxx\", \"xxx\")", "Can't convert xxx to double"),
            ("round(\"xxx\", \"xxx\")", "Can't convert xxx to double"),
            ("random(1,2,3,4)", "Invalid number of arguments for random"),
            ("random(\"xxx\", \"xxx\")", "Can't convert xxx to int"),
            ("len(1,2,3)", "Invalid number of arguments for len"),
            ("print(1,2,3)", "Invalid number of arguments for print"),
            ("int x = false", "Invalid type bool. Expected a int"),
            ("int x = \"abcd\"", "Invalid type string. Expected a int"),
            ("double x = false", "Invalid type bool. Expected a double"),
            ("bool x = 12234", "Invalid type int or double. Expected a bool"),
            ("bool x = \"abcd\"", "Invalid type string. Expected a bool"),
            (
                "1 == \"abcd\"",
                "Cannot apply Equal operator to different types: Double and String",
            ),
            (
                "1 != \"abcd\"",
                "Cannot apply NotEqual operator to different types: Double and String",
            ),
            ("print(1) + 1", "Cannot apply Plus operator to a None value"),
            (")", "Unexpected token CloseParenthesis at position 0"),
            ("end", "Unexpected token End at position 0"),
            ("(1", "Unexpected token: EndOfInput, expected: CloseParenthesis"),
            ("int = 5", "Unexpected token: Assign, expected: Identifier"),
            ("(-true)", "Can't convert true to double"),
        ];
        for (source, expected) in cases {
            assert_eq!(message(source), expected, "source: {}", source);
        }
    }

    #[test]
    fn test_offending_tokens() {
        let error = run("1 + true").unwrap_err();
        assert_eq!(error.token().kind, TokenKind::Plus);
        assert_eq!(error.token().offset, 2);

        let error = run("1 == \"a\"").unwrap_err();
        assert_eq!(error.token().kind, TokenKind::Equal);

        let error = run("int a = 1 sqrt(\"x\")").unwrap_err();
        assert_eq!(error.token().kind, TokenKind::Function);
        assert_eq!(error.token().text, "sqrt");
        assert_eq!(error.token().offset, 10);

        let error = run("x").unwrap_err();
        assert_eq!(error.token(), &Token::new(TokenKind::Identifier, "x", 0));
    }

    #[test]
    fn test_error_carries_partial_state() {
        let mut variables = VariableTable::new();
        let error = run_with(&mut variables, "int a = 1 a b").unwrap_err();

        assert_matches!(error.kind, EvalErrorKind::UnknownIdentifier { .. });
        assert_eq!(error.values(), &[RuntimeValue::Int(1), RuntimeValue::Int(1)]);
        assert_eq!(error.variables().get("a"), Some(&RuntimeValue::Int(1)));
        assert_eq!(error.tokens().len(), 7);
        assert_eq!(variables.get("a"), Some(&RuntimeValue::Int(1)));
    }

    #[test]
    fn test_unary_keeps_operand_type() {
        let values = run("int x = 5 (-x) string s = \"3\" (-s) (+2.5)").unwrap();
        assert_eq!(values[1], RuntimeValue::Int(-5));
        assert_eq!(values[3], RuntimeValue::Str("-3".to_string()));
        assert_eq!(values[4], RuntimeValue::Double(2.5));
    }

    #[test]
    fn test_if_else_selects_branch() {
        let mut variables = VariableTable::new();
        run_with(
            &mut variables,
            r#"
            int idade = 41
            if idade == 41
                string a = "igual"
            else
                string a = "diferente"
            end
            "#,
        )
        .unwrap();
        assert_eq!(variables.get("a"), Some(&RuntimeValue::Str("igual".to_string())));

        let mut variables = VariableTable::new();
        run_with(
            &mut variables,
            r#"
            int idade = 30
            bool cadastrado = true
            if idade >= 18 && cadastrado == true
                string a = "acesso liberado"
            else
                string b = "acesso negado"
            end
            "#,
        )
        .unwrap();
        assert!(!variables.contains("b"));
        assert_eq!(
            variables.get("a"),
            Some(&RuntimeValue::Str("acesso liberado".to_string()))
        );
    }

    #[test]
    fn test_nested_if_runs_only_taken_branch() {
        let program = |age: &str| {
            format!(
                r#"
                int idade = {}
                if idade >= 0
                    if idade < 12
                        string a = "criança"
                    else
                        if idade < 18
                            string b = "adolescente"
                        else
                            string c = "adulto"
                        end
                    end
                else
                    string d = "idade inválida"
                end
                "#,
                age
            )
        };

        let cases = [
            ("15", "b", "adolescente"),
            ("10", "a", "criança"),
            ("19", "c", "adulto"),
            ("-10", "d", "idade inválida"),
        ];
        for (age, name, text) in cases {
            let mut variables = VariableTable::new();
            run_with(&mut variables, &program(age)).unwrap();
            assert_eq!(
                names_and_values(&variables),
                vec![
                    ("idade".to_string(), age.to_string()),
                    (name.to_string(), text.to_string()),
                ]
            );
        }
    }

    #[test]
    fn test_if_value_is_condition() {
        let values = run("if 1 < 2 \"inside\" end if \"false\" 1 end").unwrap();
        assert_eq!(
            values,
            vec![RuntimeValue::Bool(true), RuntimeValue::Bool(false)]
        );
        assert_eq!(message("if 1 end"), "Can't convert 1 to bool");
    }

    #[test]
    fn test_while_loop() {
        let mut variables = VariableTable::new();
        let values = run_with(
            &mut variables,
            r#"
            int i = 0
            int total = 0
            while i < 5
                total = total + i
                i = i + 1
            end
            total
            "#,
        )
        .unwrap();

        assert_eq!(values[2], RuntimeValue::None);
        assert_eq!(values[3], RuntimeValue::Double(10.0));
        assert_eq!(variables.get("i"), Some(&RuntimeValue::Double(5.0)));
    }

    #[test]
    fn test_false_while_skips_nested_blocks() {
        let values = run("int n = 0 while n > 0 if true n = 1 end end n").unwrap();
        assert_eq!(values.last(), Some(&RuntimeValue::Int(0)));
    }

    #[test]
    fn test_block_structure_errors() {
        assert_eq!(message("if true 1"), "Missing end for if block");
        assert_eq!(message("if false 1"), "Missing end for if block");
        assert_eq!(message("if true 1 else 2"), "Missing end for if block");
        assert_eq!(message("while false 1"), "Missing end for while block");
        assert_eq!(message("while false else end"), "else is not allowed inside a while block");
        assert_eq!(
            message("int i = 0 while i < 1 i = i + 1 else end"),
            "else is not allowed inside a while block"
        );
        assert_eq!(
            message("if false 1 else 2 else 3 end"),
            "Unexpected token Else at position 18"
        );
    }

    #[test]
    fn test_loop_limit() {
        let tokens = tokenize("while true 1 end").unwrap();
        let preferences = EvaluatorPreferences {
            max_loop_iterations: 3,
            trace_statements: false,
        };
        let error = evaluate_with_preferences(
            &mut VariableTable::new(),
            &tokens,
            &mut MemoryHost::new(),
            preferences,
        )
        .unwrap_err();

        assert_matches!(error.kind, EvalErrorKind::LoopLimitExceeded { limit: 3 });
        assert_eq!(error.token().kind, TokenKind::While);
    }

    #[test]
    fn test_nesting_depth_is_bounded() {
        let worker = std::thread::Builder::new()
            .stack_size(32 * 1024 * 1024)
            .spawn(|| {
                let deep = format!(
                    "{}1{}",
                    "(".repeat(MAX_PARSE_DEPTH + 5),
                    ")".repeat(MAX_PARSE_DEPTH + 5)
                );
                assert_matches!(
                    run(&deep).unwrap_err().kind,
                    EvalErrorKind::MaxDepthExceeded { .. }
                );

                let shallow = format!("{}1{}", "(".repeat(20), ")".repeat(20));
                assert_eq!(first(&shallow), "1");
            })
            .unwrap();
        worker.join().unwrap();
    }

    #[test]
    fn test_argument_limit() {
        let args = vec!["1"; MAX_CALL_ARGUMENTS + 1].join(", ");
        let error = run(&format!("min({})", args)).unwrap_err();
        assert_matches!(error.kind, EvalErrorKind::TooManyArguments { .. });
    }

    #[test]
    fn test_host_side_effects() {
        let tokens = tokenize("print(\"hi\") print(1 + 1) string name = read() name").unwrap();
        let mut host = MemoryHost::new().with_input(["Pug"]);
        let values = evaluate(&mut VariableTable::new(), &tokens, &mut host).unwrap();

        assert_eq!(host.output(), ["hi".to_string(), "2".to_string()]);
        assert_eq!(values[0], RuntimeValue::None);
        assert_eq!(values[3], RuntimeValue::Str("Pug".to_string()));
    }

    #[test]
    fn test_iif_evaluates_both_branches() {
        let tokens = tokenize("iif(true, print(\"a\"), print(\"b\")) iif(1 > 2, \"x\", \"y\")")
            .unwrap();
        let mut host = MemoryHost::new();
        let values = evaluate(&mut VariableTable::new(), &tokens, &mut host).unwrap();

        assert_eq!(host.output(), ["a".to_string(), "b".to_string()]);
        assert_eq!(values[1], RuntimeValue::Str("y".to_string()));
    }
}
