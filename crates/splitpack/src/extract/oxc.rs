//! oxc-backed extractor for CommonJS sources.

use oxc_allocator::Allocator;
use oxc_ast::ast::{Argument, ArrayExpressionElement, CallExpression, Expression};
use oxc_ast_visit::{Visit, walk};
use oxc_parser::{Parser, ParserReturn};
use oxc_span::SourceType;

use super::line_index::LineIndex;
use super::{ByteRange, ExtractError, RequireContext, RequireExtractor, RequireSite, SourcePosition};

/// Recognises `require("x")` and `require.ensure("x" | ["x", ...], cb)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OxcExtractor;

impl OxcExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl RequireExtractor for OxcExtractor {
    fn extract(&self, source: &str) -> Result<RequireContext, ExtractError> {
        let allocator = Allocator::default();
        let ParserReturn {
            program, errors, ..
        } = Parser::new(&allocator, source, SourceType::cjs()).parse();

        if let Some(error) = errors.first() {
            return Err(ExtractError::Parse {
                message: error.to_string(),
            });
        }

        let mut collector = RequireCollector::new(source);
        collector.visit_program(&program);
        collector.finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallKind {
    Sync,
    Ensure,
}

fn classify(call: &CallExpression<'_>) -> Option<CallKind> {
    match &call.callee {
        Expression::Identifier(ident) if ident.name.as_str() == "require" => Some(CallKind::Sync),
        Expression::StaticMemberExpression(member) => match &member.object {
            Expression::Identifier(object)
                if object.name.as_str() == "require"
                    && member.property.name.as_str() == "ensure" =>
            {
                Some(CallKind::Ensure)
            }
            _ => None,
        },
        _ => None,
    }
}

/// Walks the AST keeping an explicit stack of open async boundaries above
/// the module scope.
struct RequireCollector<'s> {
    source: &'s str,
    lines: LineIndex,
    root: RequireContext,
    open: Vec<RequireContext>,
    error: Option<ExtractError>,
}

impl<'s> RequireCollector<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            lines: LineIndex::new(source),
            root: RequireContext::default(),
            open: Vec::new(),
            error: None,
        }
    }

    fn finish(self) -> Result<RequireContext, ExtractError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.root),
        }
    }

    fn position(&self, offset: u32) -> SourcePosition {
        let (line, column) = self.lines.line_column(offset, self.source);
        SourcePosition { line, column }
    }

    fn malformed(&mut self, position: SourcePosition, reason: &str) {
        if self.error.is_none() {
            self.error = Some(ExtractError::MalformedRequire {
                line: position.line,
                column: position.column,
                reason: reason.to_string(),
            });
        }
    }

    fn current(&mut self) -> &mut RequireContext {
        self.open.last_mut().unwrap_or(&mut self.root)
    }

    fn record_sync(&mut self, call: &CallExpression<'_>) {
        let position = self.position(call.span.start);
        match call.arguments.first() {
            Some(Argument::StringLiteral(literal)) => {
                let site = RequireSite {
                    specifier: literal.value.to_string(),
                    range: Some(ByteRange::new(literal.span.start, literal.span.end)),
                    position,
                    resolved: None,
                };
                self.current().requires.push(site);
            }
            _ => self.malformed(position, "sync require must be a string"),
        }
    }

    /// Opens a nested context for an async boundary. Returns `false` when
    /// the call was malformed and nothing was pushed.
    fn open_boundary(&mut self, call: &CallExpression<'_>) -> bool {
        let position = self.position(call.span.start);

        let (specifiers, range) = match call.arguments.first() {
            Some(Argument::StringLiteral(literal)) => (
                vec![literal.value.to_string()],
                ByteRange::new(literal.span.start, literal.span.end),
            ),
            Some(Argument::ArrayExpression(array)) => (
                array
                    .elements
                    .iter()
                    .filter_map(|element| match element {
                        ArrayExpressionElement::StringLiteral(literal) => {
                            Some(literal.value.to_string())
                        }
                        _ => None,
                    })
                    .collect(),
                ByteRange::new(array.span.start, array.span.end),
            ),
            _ => {
                self.malformed(position, "async require must be a string or array");
                return false;
            }
        };

        let requires = specifiers
            .into_iter()
            .map(|specifier| RequireSite {
                specifier,
                range: None,
                position,
                resolved: None,
            })
            .collect();

        self.open.push(RequireContext {
            requires,
            async_boundaries: Vec::new(),
            preload_range: Some(range),
            position: Some(position),
        });
        true
    }

    fn close_boundary(&mut self) {
        if let Some(boundary) = self.open.pop() {
            self.current().async_boundaries.push(boundary);
        }
    }
}

impl<'a> Visit<'a> for RequireCollector<'_> {
    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if self.error.is_some() {
            return;
        }

        match classify(call) {
            Some(CallKind::Sync) => {
                self.record_sync(call);
                walk::walk_call_expression(self, call);
            }
            Some(CallKind::Ensure) => {
                if self.open_boundary(call) {
                    walk::walk_call_expression(self, call);
                    self.close_boundary();
                }
            }
            None => walk::walk_call_expression(self, call),
        }
    }
}
