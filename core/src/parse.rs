//! Reader for canonical and MySQL-flavored DDL.
//!
//! Covers the subset of statements this crate produces: `CREATE TABLE`,
//! `ALTER TABLE ... ADD/DROP COLUMN`, `ALTER TABLE ... ADD/DROP INDEX`,
//! `CREATE [UNIQUE] INDEX ... ON ...` and `DROP INDEX ... ON ...`. Table
//! options after the column list (engine, charset, collation) are skipped
//! except `COMMENT`.
//!
//! Every token parser consumes the whitespace and comments that follow it,
//! so an error always points at the start of the offending token.
//!
//! This is not a general SQL parser.

use std::num::ParseIntError;
use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while1},
    character::complete::{char, digit0, digit1, multispace1, not_line_ending, one_of, satisfy},
    combinator::{all_consuming, cut, eof, map, map_res, not, opt, recognize, value},
    error::{context, ContextError, ErrorKind, FromExternalError, ParseError as NomParseError},
    multi::{many0, separated_list0, separated_list1},
    sequence::{delimited, pair, preceded, terminated, tuple},
    Finish, IResult, Parser,
};
use thiserror::Error;

use crate::alter::{AddColumn, AddIndex, DropColumn, DropIndex};
use crate::{AlterStatement, Column, DataType, ForeignKeyConstraint, Key, ParseResult, Table};

/// Errors raised while reading DDL text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line {line}: unterminated {what}")]
    Unterminated { what: &'static str, line: usize },
    #[error("line {line}: expected {expected}, found {found}")]
    Unexpected {
        expected: String,
        found: String,
        line: usize,
    },
    #[error("unexpected end of input, expected {0}")]
    UnexpectedEnd(String),
    #[error("line {line}: unsupported statement starting with {found}")]
    UnsupportedStatement { found: String, line: usize },
    /// Type name outside the supported set.
    #[error("unsupported type '{0}'")]
    UnsupportedType(String),
    #[error("invalid length '{0}'")]
    InvalidLength(String),
}

type Result<T> = std::result::Result<T, ParseError>;

type PResult<'a, O> = IResult<&'a str, O, DdlError<'a>>;

#[derive(Debug, Clone, PartialEq)]
enum Problem {
    Expected(&'static str),
    Unterminated(&'static str),
    UnsupportedStatement,
    UnsupportedType(String),
    InvalidLength(String),
    Syntax,
}

/// Parser error carrying the remaining input at the failure point.
#[derive(Debug, Clone, PartialEq)]
struct DdlError<'a> {
    input: &'a str,
    problem: Problem,
}

impl<'a> DdlError<'a> {
    fn new(input: &'a str, problem: Problem) -> Self {
        Self { input, problem }
    }

    fn into_parse_error(self, source: &str) -> ParseError {
        let line = line_at(source, self.input);
        let found = describe(self.input);
        let unexpected = |expected: &str, found: Option<String>| match found {
            Some(found) => ParseError::Unexpected {
                expected: expected.to_string(),
                found,
                line,
            },
            None => ParseError::UnexpectedEnd(expected.to_string()),
        };

        match self.problem {
            Problem::Expected(expected) => unexpected(expected, found),
            Problem::Syntax => unexpected("DDL", found),
            Problem::Unterminated(what) => ParseError::Unterminated { what, line },
            Problem::UnsupportedStatement => match found {
                Some(found) => ParseError::UnsupportedStatement { found, line },
                None => ParseError::UnexpectedEnd("statement".to_string()),
            },
            Problem::UnsupportedType(name) => ParseError::UnsupportedType(name),
            Problem::InvalidLength(value) => ParseError::InvalidLength(value),
        }
    }
}

impl<'a> NomParseError<&'a str> for DdlError<'a> {
    fn from_error_kind(input: &'a str, _kind: ErrorKind) -> Self {
        Self::new(input, Problem::Syntax)
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }

    /// Keeps the alternative that got furthest.
    fn or(self, other: Self) -> Self {
        if other.input.len() <= self.input.len() {
            other
        } else {
            self
        }
    }
}

impl<'a> ContextError<&'a str> for DdlError<'a> {
    fn add_context(input: &'a str, ctx: &'static str, other: Self) -> Self {
        let at_start = other.input.len() == input.len();
        match other.problem {
            Problem::Syntax | Problem::Expected(_) if at_start => {
                Self::new(input, Problem::Expected(ctx))
            }
            Problem::Syntax => Self::new(other.input, Problem::Expected(ctx)),
            _ => other,
        }
    }
}

impl<'a> FromExternalError<&'a str, ParseIntError> for DdlError<'a> {
    fn from_external_error(input: &'a str, _kind: ErrorKind, _e: ParseIntError) -> Self {
        let digits = input.split(|c: char| !c.is_ascii_digit()).next().unwrap_or(input);
        Self::new(input, Problem::InvalidLength(digits.to_string()))
    }
}

/// 1-based line of `rest`, which must be a suffix of `source`.
fn line_at(source: &str, rest: &str) -> usize {
    let offset = source.len().saturating_sub(rest.len());
    source[..offset].matches('\n').count() + 1
}

/// Short rendering of the token at the start of `rest`.
fn describe(rest: &str) -> Option<String> {
    let first = rest.chars().next()?;
    let token = match first {
        '\'' | '"' | '`' => match quoted(first, "quote")(rest) {
            Ok((after, _)) => return Some(rest[..rest.len() - after.len()].to_string()),
            Err(_) => &rest[..first.len_utf8()],
        },
        c if is_word_char(c) => {
            let end = rest.find(|c: char| !is_word_char(c)).unwrap_or(rest.len());
            &rest[..end]
        }
        c => &rest[..c.len_utf8()],
    };
    Some(format!("'{token}'"))
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Whitespace, `-- line` and `/* block */` comments.
fn ws(input: &str) -> PResult<'_, ()> {
    value((), many0(alt((value((), multispace1), line_comment, block_comment))))(input)
}

fn line_comment(input: &str) -> PResult<'_, ()> {
    value((), pair(tag("--"), not_line_ending))(input)
}

fn block_comment(input: &str) -> PResult<'_, ()> {
    let (body, _) = tag::<_, _, DdlError<'_>>("/*")(input)?;
    match body.find("*/") {
        Some(end) => Ok((&body[end + 2..], ())),
        None => Err(nom::Err::Failure(DdlError::new(
            input,
            Problem::Unterminated("comment"),
        ))),
    }
}

fn lexeme<'a, O, F>(parser: F) -> impl FnMut(&'a str) -> PResult<'a, O>
where
    F: Parser<&'a str, O, DdlError<'a>>,
{
    terminated(parser, ws)
}

/// Case-insensitive keyword that is not the prefix of a longer word.
fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> PResult<'a, &'a str> {
    context(
        word,
        lexeme(terminated(tag_no_case(word), not(satisfy(is_word_char)))),
    )
}

fn symbol<'a>(c: char) -> impl FnMut(&'a str) -> PResult<'a, char> {
    let name = match c {
        '(' => "'('",
        ')' => "')'",
        ',' => "','",
        ';' => "';'",
        '=' => "'='",
        _ => "symbol",
    };
    context(name, lexeme(char(c)))
}

/// Text between `quote` characters; a doubled quote is an escaped one.
fn quoted<'a>(quote: char, what: &'static str) -> impl Fn(&'a str) -> PResult<'a, String> {
    move |input: &'a str| {
        let Some(mut rest) = input.strip_prefix(quote) else {
            return Err(nom::Err::Error(DdlError::new(input, Problem::Syntax)));
        };
        let mut text = String::new();
        loop {
            let Some(end) = rest.find(quote) else {
                return Err(nom::Err::Failure(DdlError::new(
                    input,
                    Problem::Unterminated(what),
                )));
            };
            text.push_str(&rest[..end]);
            rest = &rest[end + quote.len_utf8()..];
            match rest.strip_prefix(quote) {
                Some(after) => {
                    text.push(quote);
                    rest = after;
                }
                None => return Ok((rest, text)),
            }
        }
    }
}

fn bare_word(input: &str) -> PResult<'_, &str> {
    take_while1(is_word_char)(input)
}

/// Backtick-quoted, double-quoted or bare identifier.
fn identifier(input: &str) -> PResult<'_, String> {
    context(
        "identifier",
        lexeme(alt((
            quoted('`', "identifier"),
            quoted('"', "identifier"),
            map(bare_word, str::to_owned),
        ))),
    )(input)
}

fn string_literal(input: &str) -> PResult<'_, String> {
    context("string literal", lexeme(quoted('\'', "string")))(input)
}

/// `( name )`
fn single_column(input: &str) -> PResult<'_, String> {
    delimited(symbol('('), identifier, symbol(')'))(input)
}

// ---------------------------------------------------------------------------
// Default values
// ---------------------------------------------------------------------------

/// `[+-]digits[.digits][e[+-]digits]` or `[+-].digits[...]`.
fn number(input: &str) -> PResult<'_, &str> {
    recognize(tuple((
        opt(one_of("+-")),
        alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        )),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    )))(input)
}

/// Balanced `( ... )`; quoted text inside does not count towards nesting.
fn parenthesized(input: &str) -> PResult<'_, ()> {
    let (mut rest, _) = char::<_, DdlError<'_>>('(')(input)?;
    let mut depth = 1;
    while let Some(c) = rest.chars().next() {
        match c {
            '\'' | '"' | '`' => {
                rest = quoted(c, "string")(rest)?.0;
                continue;
            }
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&rest[1..], ()));
                }
            }
            _ => {}
        }
        rest = &rest[c.len_utf8()..];
    }
    Err(nom::Err::Failure(DdlError::new(
        input,
        Problem::Unterminated("parenthesis"),
    )))
}

/// A string, a number, a word with optional call arguments, or a
/// parenthesized expression.
fn default_term(input: &str) -> PResult<'_, ()> {
    alt((
        value((), quoted('\'', "string")),
        value((), number),
        value((), pair(bare_word, opt(parenthesized))),
        parenthesized,
    ))(input)
}

fn default_value(input: &str) -> PResult<'_, String> {
    context(
        "default value",
        lexeme(map(recognize(default_term), str::to_owned)),
    )(input)
}

/// Returns `true` if `literal` reads back as a single `DEFAULT` value.
pub(crate) fn is_default_value(literal: &str) -> bool {
    all_consuming(default_term)(literal).is_ok()
}

// ---------------------------------------------------------------------------
// Columns and types
// ---------------------------------------------------------------------------

fn length(input: &str) -> PResult<'_, u32> {
    context("length", lexeme(map_res(digit1, str::parse::<u32>)))(input)
}

fn data_type(input: &str) -> PResult<'_, DataType> {
    let (rest, name) = context("type name", lexeme(bare_word))(input)?;
    let name = name.to_ascii_lowercase();

    if name == "enum" {
        let (rest, values) = cut(delimited(
            symbol('('),
            separated_list1(symbol(','), string_literal),
            symbol(')'),
        ))(rest)?;
        return Ok((rest, DataType::Enum(values)));
    }

    let (rest, length) = opt(delimited(symbol('('), cut(length), cut(symbol(')'))))(rest)?;
    let fail = |problem| Err(nom::Err::Failure(DdlError::new(input, problem)));

    let kind = match name.as_str() {
        "tinyint" => DataType::TinyInt,
        "smallint" => DataType::SmallInt,
        "mediumint" => DataType::MediumInt,
        "int" | "integer" => DataType::Int,
        "bigint" => DataType::BigInt,
        "float" => DataType::Float,
        "double" | "real" => DataType::Double,
        "bool" | "boolean" => DataType::Bool,
        "varchar" => match length {
            Some(length) => DataType::Varchar(length),
            None => return fail(Problem::InvalidLength("VARCHAR without length".into())),
        },
        "char" => DataType::Char(length.unwrap_or(1)),
        "binary" => DataType::Binary(length.unwrap_or(1)),
        "text" | "tinytext" | "mediumtext" | "longtext" => DataType::Text,
        "blob" | "tinyblob" | "mediumblob" | "longblob" => DataType::Blob,
        "uuid" => DataType::Uuid,
        "timestamp" | "datetime" => DataType::Timestamp,
        _ => return fail(Problem::UnsupportedType(name)),
    };

    // display widths and sign are not part of the model
    let integer = matches!(
        kind,
        DataType::TinyInt | DataType::SmallInt | DataType::MediumInt | DataType::Int | DataType::BigInt
    );
    let rest = if integer {
        opt(keyword("UNSIGNED"))(rest)?.0
    } else {
        rest
    };

    Ok((rest, kind))
}

#[derive(Debug, Clone)]
enum ColumnClause {
    Default(String),
    NotNull,
    Null,
    PrimaryKey,
    Unique,
    Comment(String),
}

fn column_clause(input: &str) -> PResult<'_, ColumnClause> {
    alt((
        map(preceded(keyword("DEFAULT"), cut(default_value)), ColumnClause::Default),
        value(ColumnClause::NotNull, pair(keyword("NOT"), cut(keyword("NULL")))),
        value(ColumnClause::Null, keyword("NULL")),
        value(
            ColumnClause::PrimaryKey,
            pair(keyword("PRIMARY"), cut(keyword("KEY"))),
        ),
        value(ColumnClause::Unique, pair(keyword("UNIQUE"), opt(keyword("KEY")))),
        map(preceded(keyword("COMMENT"), cut(string_literal)), ColumnClause::Comment),
    ))(input)
}

/// Columns read from DDL are nullable unless declared `NOT NULL`.
fn column_definition(input: &str) -> PResult<'_, Column> {
    let (input, (name, data_type)) = pair(identifier, cut(data_type))(input)?;
    let (input, clauses) = many0(column_clause)(input)?;

    let mut column = Column::new(name, data_type);
    column.nullable = true;
    for clause in clauses {
        match clause {
            ColumnClause::Default(literal) => column.default = Some(literal),
            ColumnClause::NotNull => column.nullable = false,
            ColumnClause::Null => column.nullable = true,
            ColumnClause::PrimaryKey => column.primary_key = true,
            ColumnClause::Unique => column.unique = true,
            ColumnClause::Comment(comment) => column.comment = Some(comment),
        }
    }
    Ok((input, column))
}

// ---------------------------------------------------------------------------
// CREATE TABLE
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum TableElement {
    Column(Column),
    ForeignKey(ForeignKeyConstraint),
    PrimaryKey(Vec<String>),
    Key(Key),
}

impl TableElement {
    /// Applies a `CONSTRAINT name` prefix unless the key names itself.
    fn named(self, constraint: Option<String>) -> Self {
        match self {
            TableElement::ForeignKey(mut fk) => {
                fk.name = fk.name.or(constraint);
                TableElement::ForeignKey(fk)
            }
            TableElement::Key(mut key) => {
                key.name = key.name.or(constraint);
                TableElement::Key(key)
            }
            other => other,
        }
    }
}

fn constraint_name(input: &str) -> PResult<'_, String> {
    preceded(
        not(alt((keyword("FOREIGN"), keyword("PRIMARY"), keyword("UNIQUE")))),
        identifier,
    )(input)
}

// referential actions are not modeled
fn referential_action(input: &str) -> PResult<'_, ()> {
    value(
        (),
        tuple((
            keyword("ON"),
            cut(alt((keyword("DELETE"), keyword("UPDATE")))),
            cut(alt((
                keyword("CASCADE"),
                keyword("RESTRICT"),
                recognize(pair(keyword("SET"), alt((keyword("NULL"), keyword("DEFAULT"))))),
                recognize(pair(keyword("NO"), keyword("ACTION"))),
            ))),
        )),
    )(input)
}

fn foreign_key(input: &str) -> PResult<'_, TableElement> {
    let (input, _) = pair(keyword("FOREIGN"), cut(keyword("KEY")))(input)?;
    let (input, (name, column, _, reference_table, reference_column, _)) = cut(tuple((
        opt(identifier),
        single_column,
        keyword("REFERENCES"),
        identifier,
        single_column,
        many0(referential_action),
    )))(input)?;
    Ok((
        input,
        TableElement::ForeignKey(ForeignKeyConstraint {
            name,
            column,
            reference_table,
            reference_column,
        }),
    ))
}

fn primary_key(input: &str) -> PResult<'_, TableElement> {
    let (input, _) = pair(keyword("PRIMARY"), cut(keyword("KEY")))(input)?;
    let (input, columns) = cut(delimited(
        symbol('('),
        separated_list1(symbol(','), identifier),
        symbol(')'),
    ))(input)?;
    Ok((input, TableElement::PrimaryKey(columns)))
}

fn index(input: &str) -> PResult<'_, TableElement> {
    let (input, unique) = alt((
        value(
            true,
            pair(keyword("UNIQUE"), opt(alt((keyword("KEY"), keyword("INDEX"))))),
        ),
        value(false, alt((keyword("KEY"), keyword("INDEX")))),
    ))(input)?;
    let (input, (name, column)) = cut(pair(opt(identifier), single_column))(input)?;
    Ok((input, TableElement::Key(Key { name, column, unique })))
}

fn table_element(input: &str) -> PResult<'_, TableElement> {
    let (input, constraint) =
        opt(preceded(keyword("CONSTRAINT"), opt(constraint_name)))(input)?;

    let (input, element) = match constraint {
        Some(_) => cut(context(
            "FOREIGN KEY, PRIMARY KEY or UNIQUE",
            alt((foreign_key, primary_key, index)),
        ))(input)?,
        None => alt((
            foreign_key,
            primary_key,
            index,
            map(column_definition, TableElement::Column),
        ))(input)?,
    };
    Ok((input, element.named(constraint.flatten())))
}

/// A table option; only `COMMENT [=] '...'` is kept.
fn table_option(input: &str) -> PResult<'_, Option<String>> {
    alt((
        map(
            preceded(pair(keyword("COMMENT"), opt(symbol('='))), cut(string_literal)),
            Some,
        ),
        value(
            None,
            lexeme(alt((
                value((), quoted('\'', "string")),
                value((), quoted('`', "identifier")),
                value((), bare_word),
                value((), one_of("=,.()")),
            ))),
        ),
    ))(input)
}

fn create_table(input: &str) -> PResult<'_, Statement> {
    let (input, if_not_exists) =
        opt(tuple((keyword("IF"), keyword("NOT"), keyword("EXISTS"))))(input)?;
    let (input, name) = identifier(input)?;
    let (input, elements) = delimited(
        symbol('('),
        separated_list0(symbol(','), table_element),
        context("',' or ')'", symbol(')')),
    )(input)?;
    let (input, options) = many0(table_option)(input)?;

    let mut table = Table::new(name);
    table.if_not_exists = if_not_exists.is_some();
    for element in elements {
        match element {
            TableElement::Column(column) => table.columns.push(column),
            TableElement::ForeignKey(fk) => table.foreign_keys.push(fk),
            TableElement::PrimaryKey(columns) => table.primary_key = columns,
            TableElement::Key(key) => table.keys.push(key),
        }
    }
    table.comment = options.into_iter().flatten().last();

    Ok((input, Statement::CreateTable(table)))
}

// ---------------------------------------------------------------------------
// Indexes and ALTER TABLE
// ---------------------------------------------------------------------------

fn create_index(input: &str) -> PResult<'_, AlterStatement> {
    let (input, unique) = opt(keyword("UNIQUE"))(input)?;
    let (input, _) = keyword("INDEX")(input)?;
    let (input, (name, _, table, column)) =
        cut(tuple((identifier, keyword("ON"), identifier, single_column)))(input)?;
    Ok((
        input,
        AlterStatement::AddIndex(AddIndex {
            table,
            name,
            column,
            unique: unique.is_some(),
        }),
    ))
}

fn drop_index(input: &str) -> PResult<'_, Statement> {
    let (input, (_, index, _, table)) =
        tuple((keyword("INDEX"), identifier, keyword("ON"), identifier))(input)?;
    Ok((
        input,
        Statement::Alter(vec![AlterStatement::DropIndex(DropIndex { table, index })]),
    ))
}

/// `FIRST` or `AFTER column`.
fn column_position(input: &str) -> PResult<'_, (bool, Option<String>)> {
    alt((
        value((true, None), keyword("FIRST")),
        map(preceded(keyword("AFTER"), cut(identifier)), |after| {
            (false, Some(after))
        }),
    ))(input)
}

fn add_action<'a>(input: &'a str, table: &str) -> PResult<'a, AlterStatement> {
    let (rest, index) = opt(tuple((
        opt(keyword("UNIQUE")),
        alt((keyword("INDEX"), keyword("KEY"))),
        cut(pair(identifier, single_column)),
    )))(input)?;
    if let Some((unique, _, (name, column))) = index {
        return Ok((
            rest,
            AlterStatement::AddIndex(AddIndex {
                table: table.to_string(),
                name,
                column,
                unique: unique.is_some(),
            }),
        ));
    }

    let (input, (_, column, position)) =
        tuple((opt(keyword("COLUMN")), column_definition, opt(column_position)))(input)?;
    let (first, after) = position.unwrap_or((false, None));
    Ok((
        input,
        AlterStatement::AddColumn(AddColumn {
            table: table.to_string(),
            column,
            first,
            after,
        }),
    ))
}

fn drop_action<'a>(input: &'a str, table: &str) -> PResult<'a, AlterStatement> {
    alt((
        map(
            preceded(alt((keyword("INDEX"), keyword("KEY"))), cut(identifier)),
            |index| {
                AlterStatement::DropIndex(DropIndex {
                    table: table.to_string(),
                    index,
                })
            },
        ),
        map(preceded(opt(keyword("COLUMN")), identifier), |column| {
            AlterStatement::DropColumn(DropColumn {
                table: table.to_string(),
                column,
            })
        }),
    ))(input)
}

fn alter_action<'a>(input: &'a str, table: &str) -> PResult<'a, AlterStatement> {
    context(
        "ADD or DROP",
        alt((
            preceded(keyword("ADD"), cut(|i: &'a str| add_action(i, table))),
            preceded(keyword("DROP"), cut(|i: &'a str| drop_action(i, table))),
        )),
    )(input)
}

fn alter_table<'a>(input: &'a str) -> PResult<'a, Statement> {
    let (input, table) = identifier(input)?;
    let (input, statements) =
        separated_list1(symbol(','), |i: &'a str| alter_action(i, &table))(input)?;
    Ok((input, Statement::Alter(statements)))
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum Statement {
    CreateTable(Table),
    Alter(Vec<AlterStatement>),
}

fn create(input: &str) -> PResult<'_, Statement> {
    context(
        "TABLE or INDEX",
        alt((
            preceded(keyword("TABLE"), cut(create_table)),
            map(create_index, |statement| Statement::Alter(vec![statement])),
        )),
    )(input)
}

fn statement(input: &str) -> PResult<'_, Statement> {
    alt((
        preceded(keyword("CREATE"), cut(create)),
        preceded(keyword("ALTER"), cut(preceded(keyword("TABLE"), alter_table))),
        preceded(keyword("DROP"), cut(drop_index)),
    ))(input)
}

fn document(input: &str) -> PResult<'_, ParseResult> {
    let (mut input, _) = ws(input)?;
    let mut result = ParseResult::default();

    loop {
        (input, _) = many0(symbol(';'))(input)?;
        if input.is_empty() {
            return Ok((input, result));
        }

        let (rest, parsed) = match statement(input) {
            Err(nom::Err::Error(e)) if e.input.len() == input.len() => {
                return Err(nom::Err::Failure(DdlError::new(
                    input,
                    Problem::UnsupportedStatement,
                )));
            }
            other => other?,
        };
        match parsed {
            Statement::CreateTable(table) => result.tables.push(table),
            Statement::Alter(statements) => result.alter_statements.extend(statements),
        }

        (input, _) = context("';'", alt((value((), symbol(';')), value((), eof))))(rest)?;
    }
}

/// Reads every supported statement from `sql`.
///
/// # Errors
///
/// Returns a [`ParseError`] naming the line of the first token that does not
/// fit the grammar, or [`ParseError::UnsupportedType`] for unknown type names.
///
/// # Examples
///
/// ```
/// use schema_ledger_core::{parse, DataType};
///
/// let result = parse(
///     "CREATE TABLE `users` (`id` BIGINT NOT NULL, `email` VARCHAR(255), PRIMARY KEY (`id`));
///      ALTER TABLE `users` DROP COLUMN `email`;",
/// )
/// .unwrap();
///
/// let users = &result.tables[0];
/// assert_eq!(users.primary_key, vec!["id"]);
/// assert_eq!(users.column("email").unwrap().data_type, DataType::Varchar(255));
/// assert!(users.column("email").unwrap().nullable);
/// assert_eq!(result.alter_statements.len(), 1);
/// ```
pub fn parse(sql: &str) -> Result<ParseResult> {
    document(sql)
        .finish()
        .map(|(_, result)| result)
        .map_err(|e| e.into_parse_error(sql))
}

impl FromStr for DataType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        terminated(preceded(ws, data_type), context("end of type", eof))(s)
            .finish()
            .map(|(_, kind)| kind)
            .map_err(|e| e.into_parse_error(s))
    }
}
