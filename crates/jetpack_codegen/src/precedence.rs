use swc_core::ecma::ast::{self, BinaryOp, Expr};

use crate::CodeGenConfig;

/// Expression kinds only safe as a parenthesized primary in ambiguous positions.
pub const NEEDS_PARENTHESES: i32 = 17;

pub const UNARY: i32 = 15;
pub const LOGICAL: i32 = 13;
pub const BINARY: i32 = 14;
pub const CONDITIONAL: i32 = 4;
pub const CALL: i32 = 19;

pub fn expression_precedence(expr: &Expr, config: &CodeGenConfig) -> i32 {
  match expr {
    Expr::Array(_)
    | Expr::TaggedTpl(_)
    | Expr::This(_)
    | Expr::Tpl(_)
    | Expr::Paren(_)
    | Expr::MetaProp(_)
    | Expr::PrivateName(_)
    // Always printed in parentheses
    | Expr::Seq(_) => 20,
    // Printed as `void 0`
    Expr::Ident(ident) if config.prints_void_zero(ident) => UNARY,
    Expr::Ident(_) => 20,
    // Printed as `!0` and `!1`
    Expr::Lit(ast::Lit::Bool(_)) if config.minify => UNARY,
    Expr::Lit(_) => 18,

    Expr::Member(_)
    | Expr::SuperProp(_)
    | Expr::Call(_)
    | Expr::New(_)
    | Expr::OptChain(_) => CALL,

    Expr::Arrow(_) | Expr::Class(_) | Expr::Fn(_) | Expr::Object(_) => NEEDS_PARENTHESES,

    Expr::Update(_) => 16,
    Expr::Unary(_) => UNARY,
    Expr::Bin(bin) if is_logical(bin.op) => LOGICAL,
    Expr::Bin(_) => BINARY,
    Expr::Cond(_) => CONDITIONAL,
    Expr::Assign(_) => 3,
    Expr::Await(_) | Expr::Yield(_) => 2,
    _ => 0,
  }
}

pub fn is_logical(op: BinaryOp) -> bool {
  matches!(
    op,
    BinaryOp::LogicalAnd | BinaryOp::LogicalOr | BinaryOp::NullishCoalescing
  )
}

/// Whether `expr` must be wrapped in a position that takes operands of at least `min_precedence`.
pub fn binds_weaker_than(expr: &Expr, min_precedence: i32, config: &CodeGenConfig) -> bool {
  let precedence = expression_precedence(expr, config);
  precedence == NEEDS_PARENTHESES || precedence < min_precedence
}

/// Binding power between binary operators. `**` binds tightest.
pub fn binary_operator_precedence(op: BinaryOp) -> i32 {
  use BinaryOp::*;
  match op {
    LogicalOr | NullishCoalescing => 1,
    LogicalAnd => 2,
    BitOr => 3,
    BitXor => 4,
    BitAnd => 5,
    EqEq | NotEq | EqEqEq | NotEqEq => 6,
    Lt | Gt | LtEq | GtEq | In | InstanceOf => 7,
    LShift | RShift | ZeroFillRShift => 8,
    Add | Sub => 9,
    Mul | Div | Mod => 11,
    Exp => 12,
  }
}

/// Whether `child`, an operand of a binary expression with operator `parent_op`, must be wrapped.
pub fn operand_needs_parentheses(
  child: &Expr,
  parent_op: BinaryOp,
  is_right: bool,
  config: &CodeGenConfig,
) -> bool {
  let precedence = expression_precedence(child, config);
  if precedence == NEEDS_PARENTHESES {
    return true;
  }
  let parent_precedence = if is_logical(parent_op) { LOGICAL } else { BINARY };
  if precedence != parent_precedence {
    // `(-a) ** b`
    return (!is_right && precedence == UNARY && parent_op == BinaryOp::Exp)
      || precedence < parent_precedence;
  }
  let Expr::Bin(child) = child else {
    return false;
  };
  // `??` can't be mixed with `||` or `&&` without parentheses.
  let is_nullish = |op| op == BinaryOp::NullishCoalescing;
  if is_nullish(child.op) != is_nullish(parent_op) && is_logical(child.op) && is_logical(parent_op) {
    return true;
  }
  if child.op == BinaryOp::Exp && parent_op == BinaryOp::Exp {
    return !is_right;
  }
  let child_precedence = binary_operator_precedence(child.op);
  let parent_precedence = binary_operator_precedence(parent_op);
  if is_right {
    child_precedence <= parent_precedence
  } else {
    child_precedence < parent_precedence
  }
}

/// Whether the leftmost token of `expr` is `{`, `function` or `class`, which can't start an
/// expression statement.
pub fn starts_with_declaration_token(expr: &Expr) -> bool {
  match expr {
    Expr::Object(_) | Expr::Fn(_) | Expr::Class(_) => true,
    Expr::Bin(bin) => starts_with_declaration_token(&bin.left),
    Expr::Member(member) => starts_with_declaration_token(&member.obj),
    Expr::Call(call) => match &call.callee {
      ast::Callee::Expr(callee) => starts_with_declaration_token(callee),
      _ => false,
    },
    Expr::Cond(cond) => starts_with_declaration_token(&cond.test),
    Expr::Update(update) if !update.prefix => starts_with_declaration_token(&update.arg),
    Expr::TaggedTpl(tagged) => starts_with_declaration_token(&tagged.tag),
    Expr::Assign(assign) => match &assign.left {
      ast::AssignTarget::Pat(ast::AssignTargetPat::Object(_)) => true,
      ast::AssignTarget::Simple(ast::SimpleAssignTarget::Member(member)) => {
        starts_with_declaration_token(&member.obj)
      }
      _ => false,
    },
    Expr::OptChain(chain) => match &*chain.base {
      ast::OptChainBase::Member(member) => starts_with_declaration_token(&member.obj),
      ast::OptChainBase::Call(call) => starts_with_declaration_token(&call.callee),
    },
    _ => false,
  }
}

/// `new (a())()` must keep the call inside the callee.
pub fn has_call_expression(expr: &Expr) -> bool {
  match expr {
    Expr::Call(_) => true,
    Expr::Member(member) => has_call_expression(&member.obj),
    Expr::OptChain(_) => true,
    Expr::TaggedTpl(tagged) => has_call_expression(&tagged.tag),
    _ => false,
  }
}

#[cfg(test)]
mod tests {
  use swc_core::{common::DUMMY_SP, ecma::ast::BinExpr};

  use super::*;
  use crate::{print_module, CodeGenConfig};

  fn ident(name: &str) -> Box<Expr> {
    Box::new(Expr::Ident(ast::Ident::new_no_ctxt(name.into(), DUMMY_SP)))
  }

  fn bin(op: BinaryOp, left: Box<Expr>, right: Box<Expr>) -> Box<Expr> {
    Box::new(Expr::Bin(BinExpr {
      span: DUMMY_SP,
      op,
      left,
      right,
    }))
  }

  fn print_expr(expr: Box<Expr>) -> String {
    let module = ast::Module {
      span: DUMMY_SP,
      body: vec![ast::ModuleItem::Stmt(ast::Stmt::Expr(ast::ExprStmt {
        span: DUMMY_SP,
        expr,
      }))],
      shebang: None,
    };
    print_module(&module, &CodeGenConfig::default(), None).content
  }

  #[test]
  fn synthesized_trees_get_parentheses() {
    let sum = bin(BinaryOp::Add, ident("a"), ident("b"));
    assert_eq!(print_expr(bin(BinaryOp::Mul, sum, ident("c"))), "(a + b) * c;\n");

    let diff = bin(BinaryOp::Sub, ident("b"), ident("c"));
    assert_eq!(print_expr(bin(BinaryOp::Sub, ident("a"), diff)), "a - (b - c);\n");

    let diff = bin(BinaryOp::Sub, ident("a"), ident("b"));
    assert_eq!(print_expr(bin(BinaryOp::Sub, diff, ident("c"))), "a - b - c;\n");

    let pow = bin(BinaryOp::Exp, ident("b"), ident("c"));
    assert_eq!(print_expr(bin(BinaryOp::Exp, ident("a"), pow)), "a ** b ** c;\n");

    let or = bin(BinaryOp::LogicalOr, ident("a"), ident("b"));
    assert_eq!(
      print_expr(bin(BinaryOp::NullishCoalescing, or, ident("c"))),
      "(a || b) ?? c;\n"
    );

    let and = bin(BinaryOp::LogicalAnd, ident("a"), ident("b"));
    assert_eq!(print_expr(bin(BinaryOp::LogicalOr, and, ident("c"))), "a && b || c;\n");
  }

  /// The expression of a single expression statement, parentheses removed.
  fn parsed_expr(source: &str) -> Box<Expr> {
    let module = jetpack_compiler::parse("/a.js", source, jetpack_common::Loader::Js).unwrap();
    let Some(ast::ModuleItem::Stmt(ast::Stmt::Expr(stmt))) = module.body.into_iter().next() else {
      panic!("{source} is not an expression statement");
    };
    match *stmt.expr {
      Expr::Paren(paren) => paren.expr,
      expr => Box::new(expr),
    }
  }

  #[test]
  fn synthesized_arrows_are_wrapped_as_operands() {
    let not = Box::new(Expr::Unary(ast::UnaryExpr {
      span: DUMMY_SP,
      op: ast::UnaryOp::Bang,
      arg: parsed_expr("(() => x);"),
    }));
    assert_eq!(print_expr(not), "!(() => x);\n");

    let cond = Box::new(Expr::Cond(ast::CondExpr {
      span: DUMMY_SP,
      test: parsed_expr("(() => a);"),
      cons: ident("b"),
      alt: ident("c"),
    }));
    assert_eq!(print_expr(cond), "(() => a) ? b : c;\n");

    let awaited = Box::new(Expr::Await(ast::AwaitExpr {
      span: DUMMY_SP,
      arg: parsed_expr("(() => a);"),
    }));
    assert_eq!(print_expr(awaited), "await (() => a);\n");
  }

  #[test]
  fn leading_object_is_detected() {
    let object = Box::new(Expr::Object(ast::ObjectLit {
      span: DUMMY_SP,
      props: vec![],
    }));
    assert!(starts_with_declaration_token(&bin(BinaryOp::Add, object, ident("a"))));
    assert!(!starts_with_declaration_token(&ident("a")));
  }
}
