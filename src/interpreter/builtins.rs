//! Built-in function implementations
//!
//! This module provides the implementation of C built-in functions that are
//! directly handled by the interpreter rather than being defined in user code.
//! A user function with the same name always wins.
//!
//! # Supported Built-ins
//!
//! - `printf(format, ...)`: Formatted output to the terminal
//! - `puts(s)`, `gets()`: Line output and input
//! - `scanf(format, &a, ...)`: Whitespace-separated input into places
//! - `strlen`, `strcpy`, `strcmp`: C strings held as string values, char
//!   arrays or NUL-terminated heap cells
//! - `malloc(size)`, `free(ptr)`, `realloc(ptr, size)`: Heap management
//!
//! # Implementation Notes
//!
//! - `printf` supports `%d %i %u %x %X %f %e %g %c %s %p %%` with flags, width
//!   and precision. Unknown specifiers are copied through unchanged and a
//!   missing argument prints as zero or empty
//! - `free(0)` is a no-op
//! - All built-ins are implemented as methods on the [`Interpreter`] struct

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{ErrorKind, HeapResultExt, RuntimeError};
use crate::memory::value::{Address, ArrayRef, Value};
use crate::parser::ast::{AstNode, SourceLocation, UnOp};
use crate::terminal::Terminal;
use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

/// One parsed `%...` conversion
#[derive(Debug, Default)]
struct FormatSpec {
    left_align: bool,
    zero_pad: bool,
    plus: bool,
    space: bool,
    alternate: bool,
    width: Option<usize>,
    precision: Option<usize>,
    conversion: char,
}

impl FormatSpec {
    /// Parse the text after a `%`, returning the spec and the raw characters
    /// consumed; `None` when the string ends before a conversion character
    fn parse(chars: &mut Peekable<Chars<'_>>) -> (Option<FormatSpec>, String) {
        let mut raw = String::from("%");
        let mut spec = FormatSpec::default();

        while let Some(&ch) = chars.peek() {
            match ch {
                '-' => spec.left_align = true,
                '0' => spec.zero_pad = true,
                '+' => spec.plus = true,
                ' ' => spec.space = true,
                '#' => spec.alternate = true,
                _ => break,
            }
            raw.push(ch);
            chars.next();
        }

        spec.width = Self::number(chars, &mut raw);
        if chars.peek() == Some(&'.') {
            raw.push('.');
            chars.next();
            spec.precision = Some(Self::number(chars, &mut raw).unwrap_or(0));
        }

        // Length modifiers carry no meaning for tagged values
        while let Some(&ch @ ('l' | 'h' | 'L' | 'z')) = chars.peek() {
            raw.push(ch);
            chars.next();
        }

        match chars.next() {
            Some(conversion) => {
                raw.push(conversion);
                spec.conversion = conversion;
                (Some(spec), raw)
            }
            None => (None, raw),
        }
    }

    fn number(chars: &mut Peekable<Chars<'_>>, raw: &mut String) -> Option<usize> {
        let mut digits = String::new();
        while let Some(&ch) = chars.peek() {
            if !ch.is_ascii_digit() {
                break;
            }
            digits.push(ch);
            raw.push(ch);
            chars.next();
        }
        digits.parse().ok()
    }

    /// Apply width and alignment; zero padding goes between sign and digits
    fn pad(&self, sign: &str, body: &str, numeric: bool) -> String {
        let len = sign.chars().count() + body.chars().count();
        let width = self.width.unwrap_or(0);
        if len >= width {
            return format!("{}{}", sign, body);
        }

        let fill = width - len;
        if self.left_align {
            format!("{}{}{}", sign, body, " ".repeat(fill))
        } else if self.zero_pad && numeric {
            format!("{}{}{}", sign, "0".repeat(fill), body)
        } else {
            format!("{}{}{}", " ".repeat(fill), sign, body)
        }
    }

    fn sign(&self, negative: bool) -> &'static str {
        if negative {
            "-"
        } else if self.plus {
            "+"
        } else if self.space {
            " "
        } else {
            ""
        }
    }
}

impl<T: Terminal> Interpreter<T> {
    /// Dispatch a call to a built-in with evaluated arguments
    pub(crate) fn call_builtin(
        &mut self,
        name: &str,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match name {
            "printf" => self.builtin_printf(&args, location),
            "puts" => {
                let text = match args.first() {
                    Some(value) => self.c_string_of(value, location)?,
                    None => String::new(),
                };
                self.terminal.write(&text);
                self.terminal.write("\n");
                Ok(Value::Int(0))
            }
            "gets" => self.builtin_gets(args.first(), location),
            "scanf" => {
                let Some((format, targets)) = args.split_first() else {
                    return Err(RuntimeError::type_mismatch(
                        "scanf requires a format string",
                        location,
                    ));
                };
                let format = self.c_string_of(format, location)?;
                let Some(values) = self.read_scanned(&format) else {
                    return Ok(Value::Int(-1));
                };
                let mut stored = 0;
                for (value, target) in values.into_iter().zip(targets) {
                    self.store_through(target, value, location)?;
                    stored += 1;
                }
                Ok(Value::Int(stored))
            }
            "strlen" => {
                let bytes = self.c_bytes_of(Self::arg(&args, 0), location)?;
                Ok(Value::Int(bytes.len() as i64))
            }
            "strcpy" => {
                let dst = Self::arg(&args, 0);
                let src = self.c_string_of(Self::arg(&args, 1), location)?;
                match dst {
                    Value::Array(items) => {
                        Self::write_chars(items, &src, location)?;
                        Ok(dst.clone())
                    }
                    Value::Pointer(addr) if *addr != 0 => {
                        self.write_heap_string(*addr, &src, location)?;
                        Ok(dst.clone())
                    }
                    _ => Ok(Value::Str(src)),
                }
            }
            "strcmp" => {
                let a = self.c_bytes_of(Self::arg(&args, 0), location)?;
                let b = self.c_bytes_of(Self::arg(&args, 1), location)?;
                Ok(Value::Int(match a.cmp(&b) {
                    Ordering::Less => -1,
                    Ordering::Equal => 0,
                    Ordering::Greater => 1,
                }))
            }
            "malloc" => {
                let size = Self::int_arg(&args, 0);
                let addr = self.heap.allocate(size).at(location)?;
                Ok(Value::Pointer(addr))
            }
            "free" => {
                match Self::address_arg(&args, 0, location)? {
                    0 => {}
                    addr => self.heap.deallocate(addr).at(location)?,
                }
                Ok(Value::Void)
            }
            "realloc" => {
                let addr = Self::address_arg(&args, 0, location)?;
                let size = Self::int_arg(&args, 1);
                let new_addr = self.heap.reallocate(addr, size).at(location)?;
                Ok(Value::Pointer(new_addr))
            }
            _ => Err(RuntimeError::undefined_function(name, location)),
        }
    }

    fn arg(args: &[Value], index: usize) -> &Value {
        const VOID: &Value = &Value::Void;
        args.get(index).unwrap_or(VOID)
    }

    fn int_arg(args: &[Value], index: usize) -> i64 {
        args.get(index).and_then(Value::as_int).unwrap_or(0)
    }

    fn address_arg(
        args: &[Value],
        index: usize,
        location: SourceLocation,
    ) -> Result<Address, RuntimeError> {
        match args.get(index) {
            None => Ok(0),
            Some(value) if value.is_integer_like() => value.as_address().ok_or_else(|| {
                RuntimeError::new(
                    ErrorKind::InvalidAddress,
                    format!("invalid address {}", value),
                    location,
                )
            }),
            Some(value) => Err(RuntimeError::new(
                ErrorKind::InvalidAddress,
                format!("{} is not a heap pointer", value.type_name()),
                location,
            )),
        }
    }

    // ===== printf =====

    pub(crate) fn builtin_printf(
        &mut self,
        args: &[Value],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let Some((format, rest)) = args.split_first() else {
            return Ok(Value::Int(0));
        };
        let format = self.c_string_of(format, location)?;
        let output = self.format_printf(&format, rest, location)?;
        self.terminal.write(&output);
        Ok(Value::Int(output.chars().count() as i64))
    }

    pub(crate) fn format_printf(
        &self,
        format: &str,
        args: &[Value],
        location: SourceLocation,
    ) -> Result<String, RuntimeError> {
        let mut output = String::new();
        let mut chars = format.chars().peekable();
        let mut args = args.iter();

        while let Some(ch) = chars.next() {
            if ch != '%' {
                output.push(ch);
                continue;
            }

            let (spec, raw) = FormatSpec::parse(&mut chars);
            let Some(spec) = spec else {
                output.push_str(&raw);
                break;
            };

            match spec.conversion {
                '%' => output.push('%'),
                'd' | 'i' | 'u' | 'x' | 'X' | 'f' | 'F' | 'e' | 'E' | 'g' | 'G' | 'c' | 's'
                | 'p' => {
                    let text = self.format_one(&spec, args.next(), location)?;
                    output.push_str(&text);
                }
                // Unknown conversion: copied verbatim, no argument consumed
                _ => output.push_str(&raw),
            }
        }

        Ok(output)
    }

    fn format_one(
        &self,
        spec: &FormatSpec,
        arg: Option<&Value>,
        location: SourceLocation,
    ) -> Result<String, RuntimeError> {
        let int_value = || arg.and_then(Value::as_int).unwrap_or(0);
        let float_value = || match arg {
            Some(Value::Pointer(addr)) => *addr as f64,
            Some(value) => value.as_float().unwrap_or(0.0),
            None => 0.0,
        };

        Ok(match spec.conversion {
            'd' | 'i' => {
                let n = int_value();
                let mut digits = n.unsigned_abs().to_string();
                if let Some(precision) = spec.precision {
                    digits = format!("{:0>width$}", digits, width = precision);
                }
                spec.pad(spec.sign(n < 0), &digits, true)
            }
            'u' | 'x' | 'X' => {
                let n = int_value();
                // Negative values wrap like a 32-bit unsigned int
                let n = if n < 0 { n as u32 as u64 } else { n as u64 };
                let mut digits = match spec.conversion {
                    'x' => format!("{:x}", n),
                    'X' => format!("{:X}", n),
                    _ => n.to_string(),
                };
                if let Some(precision) = spec.precision {
                    digits = format!("{:0>width$}", digits, width = precision);
                }
                let prefix = match spec.conversion {
                    'x' if spec.alternate && n != 0 => "0x",
                    'X' if spec.alternate && n != 0 => "0X",
                    _ => "",
                };
                spec.pad(prefix, &digits, true)
            }
            'f' | 'F' | 'e' | 'E' | 'g' | 'G' => {
                let f = float_value();
                let precision = spec.precision.unwrap_or(6);
                let upper = spec.conversion.is_ascii_uppercase();
                let body = match spec.conversion {
                    'f' | 'F' => format_fixed(f.abs(), precision),
                    'e' | 'E' => format_exponent(f.abs(), precision, upper),
                    _ => format_general(f.abs(), precision, upper, spec.alternate),
                };
                let negative = f.is_sign_negative() && !f.is_nan();
                spec.pad(spec.sign(negative), &body, f.is_finite())
            }
            'c' => {
                let c = match arg {
                    Some(Value::Str(s)) => s.chars().next().unwrap_or('\0'),
                    Some(value) => value.as_int().map(|n| n as u8 as char).unwrap_or('\0'),
                    None => '\0',
                };
                spec.pad("", &c.to_string(), false)
            }
            's' => {
                let mut text = match arg {
                    None => String::new(),
                    Some(Value::Pointer(0)) => "(null)".to_string(),
                    Some(value @ (Value::Str(_) | Value::Array(_) | Value::Pointer(_))) => {
                        self.c_string_of(value, location)?
                    }
                    Some(value) => value.to_string(),
                };
                if let Some(precision) = spec.precision {
                    text = text.chars().take(precision).collect();
                }
                spec.pad("", &text, false)
            }
            'p' => {
                let addr = arg.and_then(Value::as_int).unwrap_or(0);
                spec.pad("", &format!("0x{:x}", addr), false)
            }
            _ => String::new(),
        })
    }

    // ===== Input =====

    fn builtin_gets(
        &mut self,
        buffer: Option<&Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let line = self.terminal.read_line().unwrap_or_default();
        match buffer {
            Some(Value::Array(items)) => {
                Self::write_chars(items, &line, location)?;
                Ok(Value::Array(items.clone()))
            }
            Some(Value::Pointer(addr)) if *addr != 0 => {
                self.write_heap_string(*addr, &line, location)?;
                Ok(Value::Pointer(*addr))
            }
            _ => Ok(Value::Str(line)),
        }
    }

    /// `scanf` with argument expressions, so `&x` can name a variable
    pub(crate) fn builtin_scanf(
        &mut self,
        args: &[AstNode],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let Some((format, targets)) = args.split_first() else {
            return Err(RuntimeError::type_mismatch(
                "scanf requires a format string",
                location,
            ));
        };
        let format = self.evaluate(format)?;
        let format = self.c_string_of(&format, location)?;

        let Some(values) = self.read_scanned(&format) else {
            return Ok(Value::Int(-1));
        };

        let mut stored = 0;
        for (value, target) in values.into_iter().zip(targets) {
            self.store_scanned(target, value, location)?;
            stored += 1;
        }
        Ok(Value::Int(stored))
    }

    /// Read one line and convert its words per the format's conversions,
    /// stopping at the first word that does not convert; `None` at end of input
    fn read_scanned(&mut self, format: &str) -> Option<Vec<Value>> {
        let line = self.terminal.read_line()?;
        let mut words = line.split_whitespace();
        let mut values = Vec::new();

        for conversion in scan_conversions(format) {
            let Some(value) = words.next().and_then(|word| scan_word(conversion, word)) else {
                break;
            };
            values.push(value);
        }
        Some(values)
    }

    fn store_scanned(
        &mut self,
        target: &AstNode,
        value: Value,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        if let AstNode::UnaryOp {
            op: UnOp::AddrOf,
            operand,
            ..
        } = target
        {
            let place = self.resolve_place(operand, location)?;
            let current = self.peek_place(&place);
            if let (Some(Value::Array(items)), Value::Str(s)) = (&current, &value) {
                return Self::write_chars(items, s, location);
            }
            let value = Self::coerce_like(current.as_ref(), value);
            return self.write_place(&place, value, location);
        }

        let target = self.evaluate(target)?;
        self.store_through(&target, value, location)
    }

    /// Store a scanned value through a buffer or pointer value
    fn store_through(
        &mut self,
        target: &Value,
        value: Value,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        match (target, value) {
            (Value::Array(items), Value::Str(s)) => Self::write_chars(items, &s, location),
            (Value::Array(items), value) => {
                let mut items = items.borrow_mut();
                let first = items.first_mut().ok_or_else(|| {
                    RuntimeError::new(ErrorKind::OutOfBounds, "empty scanf buffer", location)
                })?;
                *first = Self::coerce_like(Some(&*first), value);
                Ok(())
            }
            (Value::Pointer(addr), Value::Str(s)) if *addr != 0 => {
                self.write_heap_string(*addr, &s, location)
            }
            (Value::Pointer(addr), value) if *addr != 0 => {
                let current = self.heap.load(*addr).ok();
                let value = Self::coerce_like(current.as_ref(), value);
                self.heap.store(*addr, value).at(location)
            }
            (other, _) => Err(RuntimeError::new(
                ErrorKind::InvalidAddress,
                format!("scanf needs an address, got {}", other.type_name()),
                location,
            )),
        }
    }

    // ===== C strings =====

    /// Bytes of a C string held as a string value, char array or heap cells
    pub(crate) fn c_bytes_of(
        &self,
        value: &Value,
        location: SourceLocation,
    ) -> Result<Vec<u8>, RuntimeError> {
        match value {
            Value::Str(s) => Ok(s.as_bytes().to_vec()),
            Value::Array(items) => Ok(items
                .borrow()
                .iter()
                .map_while(|v| match v.as_int() {
                    Some(0) | None => None,
                    Some(n) => Some(n as u8),
                })
                .collect()),
            Value::Pointer(0) => Err(RuntimeError::new(
                ErrorKind::InvalidAddress,
                "null pointer used as a string",
                location,
            )),
            Value::Pointer(addr) => {
                let mut bytes = Vec::new();
                let mut cell = *addr;
                loop {
                    match self.heap.load(cell).at(location)?.as_int() {
                        Some(0) | None => break,
                        Some(n) => bytes.push(n as u8),
                    }
                    cell += 1;
                }
                Ok(bytes)
            }
            other => Err(RuntimeError::type_mismatch(
                format!("expected a string, got {}", other.type_name()),
                location,
            )),
        }
    }

    pub(crate) fn c_string_of(
        &self,
        value: &Value,
        location: SourceLocation,
    ) -> Result<String, RuntimeError> {
        match value {
            Value::Str(s) => Ok(s.clone()),
            _ => {
                let bytes = self.c_bytes_of(value, location)?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
        }
    }

    /// Copy `s` plus its terminator into a char array
    fn write_chars(
        items: &ArrayRef,
        s: &str,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        let mut items = items.borrow_mut();
        let needed = s.len() + 1;
        if needed > items.len() {
            return Err(RuntimeError::new(
                ErrorKind::OutOfBounds,
                format!("{} bytes do not fit in a buffer of {}", needed, items.len()),
                location,
            ));
        }
        for (slot, byte) in items.iter_mut().zip(s.bytes().chain(std::iter::once(0))) {
            *slot = Value::Char(byte);
        }
        Ok(())
    }

    /// Copy `s` plus its terminator into consecutive heap cells
    fn write_heap_string(
        &mut self,
        addr: Address,
        s: &str,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        for (i, byte) in s.bytes().chain(std::iter::once(0)).enumerate() {
            self.heap
                .store(addr + i as Address, Value::Char(byte))
                .at(location)?;
        }
        Ok(())
    }
}

fn format_fixed(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return non_finite(value);
    }
    format!("{:.*}", precision, value)
}

/// `d.ddde+XX` with at least two exponent digits
fn format_exponent(value: f64, precision: usize, upper: bool) -> String {
    if !value.is_finite() {
        return non_finite(value);
    }
    let formatted = format!("{:.*e}", precision, value);
    let Some((mantissa, exponent)) = formatted.split_once('e') else {
        return formatted;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    format!(
        "{}{}{}{:02}",
        mantissa,
        if upper { 'E' } else { 'e' },
        if exponent < 0 { '-' } else { '+' },
        exponent.abs()
    )
}

/// `%g`: fixed or exponent form, whichever C would pick, without trailing zeros
fn format_general(value: f64, precision: usize, upper: bool, keep_zeros: bool) -> String {
    if !value.is_finite() {
        return non_finite(value);
    }
    let precision = precision.max(1);
    let exponent = if value == 0.0 {
        0
    } else {
        // Exponent after rounding to `precision` significant digits
        format!("{:.*e}", precision - 1, value)
            .split_once('e')
            .and_then(|(_, e)| e.parse::<i32>().ok())
            .unwrap_or(0)
    };

    if exponent < -4 || exponent >= precision as i32 {
        let formatted = format_exponent(value, precision - 1, upper);
        if keep_zeros {
            return formatted;
        }
        let split = formatted.find(['e', 'E']).unwrap_or(formatted.len());
        let (mantissa, exp) = formatted.split_at(split);
        format!("{}{}", strip_trailing_zeros(mantissa), exp)
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        let formatted = format!("{:.*}", decimals, value);
        if keep_zeros {
            formatted
        } else {
            strip_trailing_zeros(&formatted).to_string()
        }
    }
}

fn strip_trailing_zeros(s: &str) -> &str {
    if !s.contains('.') {
        return s;
    }
    s.trim_end_matches('0').trim_end_matches('.')
}

fn non_finite(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else {
        "inf".to_string()
    }
}

/// Conversion characters of a scanf format, in order
fn scan_conversions(format: &str) -> Vec<char> {
    let mut conversions = Vec::new();
    let mut chars = format.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            continue;
        }
        while chars.peek().is_some_and(|c| c.is_ascii_digit() || matches!(c, 'l' | 'h' | 'L')) {
            chars.next();
        }
        match chars.next() {
            Some('%') | None => {}
            Some(conversion) => conversions.push(conversion),
        }
    }
    conversions
}

/// Convert one input word; `None` when it does not match the conversion
fn scan_word(conversion: char, word: &str) -> Option<Value> {
    match conversion {
        'd' | 'i' | 'u' => leading_int(word).map(Value::Int),
        'x' | 'X' => {
            let digits = word.trim_start_matches("0x").trim_start_matches("0X");
            let end = digits
                .find(|c: char| !c.is_ascii_hexdigit())
                .unwrap_or(digits.len());
            i64::from_str_radix(&digits[..end], 16).ok().map(Value::Int)
        }
        'f' | 'e' | 'g' | 'E' | 'G' => leading_float(word).map(Value::Float),
        'c' => word.bytes().next().map(Value::Char),
        's' => Some(Value::Str(word.to_string())),
        _ => None,
    }
}

/// Longest `[+-]digits` prefix, as C's `%d` reads it
fn leading_int(word: &str) -> Option<i64> {
    let sign_len = usize::from(word.starts_with(['+', '-']));
    let digits = word[sign_len..]
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(word.len() - sign_len);
    word[..sign_len + digits].parse().ok()
}

/// Longest prefix that parses as a float
fn leading_float(word: &str) -> Option<f64> {
    (1..=word.len())
        .rev()
        .filter(|&end| word.is_char_boundary(end))
        .find_map(|end| word[..end].parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::MockTerminal;

    fn printf(format: &str, args: &[Value]) -> String {
        Interpreter::new()
            .format_printf(format, args, SourceLocation::default())
            .unwrap()
    }

    #[test]
    fn test_printf_integers() {
        assert_eq!(printf("%d|%i", &[Value::Int(-42), Value::Char(b'A')]), "-42|65");
        assert_eq!(
            printf("[%5d][%-5d][%05d]", &[Value::Int(42), Value::Int(42), Value::Int(-42)]),
            "[   42][42   ][-0042]"
        );
        assert_eq!(printf("%+d %.3d", &[Value::Int(7), Value::Int(7)]), "+7 007");
        assert_eq!(
            printf("%x %X %#x", &[Value::Int(255), Value::Int(255), Value::Int(255)]),
            "ff FF 0xff"
        );
        assert_eq!(printf("%u", &[Value::Int(-1)]), "4294967295");
    }

    #[test]
    fn test_printf_floats() {
        assert_eq!(printf("%f", &[Value::Float(3.14159)]), "3.141590");
        assert_eq!(printf("%.2f|%8.3f", &[Value::Float(2.5), Value::Float(-1.0)]), "2.50|  -1.000");
        assert_eq!(printf("%f", &[Value::Int(2)]), "2.000000");
        assert_eq!(printf("%e", &[Value::Float(12345.678)]), "1.234568e+04");
        assert_eq!(
            printf("%g %g %g", &[Value::Float(0.0001), Value::Float(100000.0), Value::Float(1e-5)]),
            "0.0001 100000 1e-05"
        );
    }

    #[test]
    fn test_printf_text() {
        assert_eq!(printf("%c%c", &[Value::Char(b'h'), Value::Int(105)]), "hi");
        assert_eq!(
            printf(
                "[%s][%6s][%-4s][%.2s]",
                &[
                    Value::Str("a".into()),
                    Value::Str("right".into()),
                    Value::Str("l".into()),
                    Value::Str("trim".into()),
                ]
            ),
            "[a][ right][l   ][tr]"
        );
        assert_eq!(printf("%s", &[Value::char_array("buf")]), "buf");
        assert_eq!(printf("%p", &[Value::Pointer(0x1000)]), "0x1000");
    }

    #[test]
    fn test_printf_missing_and_unknown() {
        assert_eq!(printf("%d %f %s|", &[]), "0 0.000000 |");
        assert_eq!(printf("%c", &[]), "\0");
        assert_eq!(printf("100%% %q %", &[Value::Int(1)]), "100% %q %");
    }

    #[test]
    fn test_printf_returns_count() {
        let mut interp = Interpreter::new();
        let results = interp.interpret("printf(\"%d\\n\", 1234);").unwrap();
        assert_eq!(results, vec![Value::Int(5)]);
        assert_eq!(interp.terminal().get_output(), vec!["1234"]);
    }

    #[test]
    fn test_utf8_text_passes_through() {
        let mut interp = Interpreter::new();
        let src = r#"
            char word[8] = "né";
            char *h = malloc(8);
            strcpy(h, "✓ ok");
            printf("héllo ✓\n");
            puts("né");
            printf("[%s] [%s]\n", word, h);
        "#;
        interp.interpret(src).unwrap();
        assert_eq!(interp.terminal().output(), "héllo ✓\nné\n[né] [✓ ok]\n");
    }

    #[test]
    fn test_scan_helpers() {
        assert_eq!(scan_conversions("%d, %5s %lf %%"), vec!['d', 's', 'f']);
        assert_eq!(scan_word('d', "-12abc"), Some(Value::Int(-12)));
        assert_eq!(scan_word('d', "abc"), None);
        assert_eq!(scan_word('x', "0x1f"), Some(Value::Int(31)));
        assert_eq!(scan_word('f', "2.5kg"), Some(Value::Float(2.5)));
        assert_eq!(scan_word('c', "xyz"), Some(Value::Char(b'x')));
    }

    #[test]
    fn test_scanf_into_places() {
        let terminal = MockTerminal::with_input(["12 7 3.5 word"]);
        let mut interp = Interpreter::with_terminal(terminal, Default::default());
        let src = r#"
            int a; int arr[2]; double d; char buf[8];
            int n = scanf("%d %d %lf %s", &a, &arr[1], &d, buf);
            a + arr[1];
        "#;
        let results = interp.interpret(src).unwrap();
        assert_eq!(results, vec![Value::Int(4), Value::Int(19)]);
        assert_eq!(interp.global("d"), Some(&Value::Float(3.5)));
        assert_eq!(interp.global("buf").and_then(Value::as_c_string).as_deref(), Some("word"));
    }

    #[test]
    fn test_scanf_at_end_of_input() {
        let mut interp = Interpreter::new();
        let results = interp.interpret("int x = 5; scanf(\"%d\", &x); x;").unwrap();
        assert_eq!(results, vec![Value::Int(5), Value::Int(-1), Value::Int(5)]);
    }

    #[test]
    fn test_gets_and_puts() {
        let terminal = MockTerminal::with_input(["Ada"]);
        let mut interp = Interpreter::with_terminal(terminal, Default::default());
        interp
            .interpret("char *name = gets(); puts(\"hello\"); printf(\"%s!\\n\", name);")
            .unwrap();
        assert_eq!(interp.terminal().get_output(), vec!["hello", "Ada!"]);
    }

    #[test]
    fn test_string_functions() {
        let mut interp = Interpreter::new();
        let src = r#"
            char buf[16];
            strcpy(buf, "copy");
            char *h = malloc(8);
            strcpy(h, buf);
            strlen(h) * 100 + strcmp("abc", "abd") * 10 + strcmp(buf, "copy");
        "#;
        let results = interp.interpret(src).unwrap();
        assert_eq!(results.last(), Some(&Value::Int(390)));
    }

    #[test]
    fn test_heap_builtins() {
        let mut interp = Interpreter::new();
        let src = r#"
            int *p = malloc(2);
            p[1] = 5;
            p = realloc(p, 4);
            free(0);
            p[1] + p[3];
        "#;
        let results = interp.interpret(src).unwrap();
        assert_eq!(results.last(), Some(&Value::Int(5)));
        assert_eq!(interp.heap().stats().live_blocks, 1);
    }
}
