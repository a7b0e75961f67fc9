use swc_core::ecma::ast::{self, BinaryOp, Expr};

use crate::{
  precedence::{
    binds_weaker_than, has_call_expression, operand_needs_parentheses,
    starts_with_declaration_token, CALL, CONDITIONAL, UNARY,
  },
  CodeGen,
};

impl<'a> CodeGen<'a> {
  pub(crate) fn emit_expr(&mut self, expr: &Expr) {
    match expr {
      Expr::This(this) => self.write_mapped("this", this.span),
      Expr::Ident(ident) => self.emit_reference(ident),
      Expr::Lit(lit) => self.emit_lit(lit),
      Expr::Array(array) => self.emit_array(array),
      Expr::Object(object) => self.emit_object(object),
      Expr::Fn(func) => {
        self.emit_function(func.ident.as_ref(), &func.function);
      }
      Expr::Class(class) => self.emit_class(class.ident.as_ref(), &class.class),
      Expr::Arrow(arrow) => self.emit_arrow(arrow),
      Expr::Unary(unary) => {
        let op = unary.op.as_str();
        self.write(op);
        if op.len() > 1 {
          self.write(" ");
        }
        self.emit_wrapped(&unary.arg, binds_weaker_than(&unary.arg, UNARY, self.config));
      }
      Expr::Update(update) => {
        let op = match update.op {
          ast::UpdateOp::PlusPlus => "++",
          ast::UpdateOp::MinusMinus => "--",
        };
        let wrap = binds_weaker_than(&update.arg, CALL, self.config);
        if update.prefix {
          self.write(op);
          self.emit_wrapped(&update.arg, wrap);
        } else {
          self.emit_wrapped(&update.arg, wrap);
          self.write(op);
        }
      }
      Expr::Bin(bin) => self.emit_bin(bin),
      Expr::Assign(assign) => {
        self.emit_assign_target(&assign.left);
        self.write_operator(assign.op.as_str());
        self.emit_expr(&assign.right);
      }
      Expr::Member(member) => self.emit_member(member, false),
      Expr::SuperProp(super_prop) => {
        self.write_mapped("super", super_prop.obj.span);
        match &super_prop.prop {
          ast::SuperProp::Ident(ident) => {
            self.write(".");
            self.write_mapped(&ident.sym, ident.span);
          }
          ast::SuperProp::Computed(computed) => {
            self.write("[");
            self.emit_expr(&computed.expr);
            self.write("]");
          }
        }
      }
      Expr::Cond(cond) => {
        let wrap = binds_weaker_than(&cond.test, CONDITIONAL + 1, self.config);
        self.emit_wrapped(&cond.test, wrap);
        self.write_operator("?");
        self.emit_expr(&cond.cons);
        self.write_operator(":");
        self.emit_expr(&cond.alt);
      }
      Expr::Call(call) => {
        match &call.callee {
          ast::Callee::Super(sup) => self.write_mapped("super", sup.span),
          ast::Callee::Import(import) => self.write_mapped("import", import.span),
          ast::Callee::Expr(callee) => self.emit_callee(callee),
        }
        self.emit_args(&call.args);
      }
      Expr::New(new) => {
        self.write("new ");
        let wrap = binds_weaker_than(&new.callee, CALL, self.config)
          || has_call_expression(&new.callee);
        self.emit_wrapped(&new.callee, wrap);
        self.emit_args(new.args.as_deref().unwrap_or_default());
      }
      Expr::Seq(seq) => {
        self.write("(");
        for (idx, expr) in seq.exprs.iter().enumerate() {
          if idx > 0 {
            self.write_comma();
          }
          self.emit_expr(expr);
        }
        self.write(")");
      }
      Expr::Tpl(tpl) => self.emit_tpl(tpl),
      Expr::TaggedTpl(tagged) => {
        self.emit_callee(&tagged.tag);
        self.emit_tpl(&tagged.tpl);
      }
      Expr::Yield(yield_expr) => {
        self.write(if yield_expr.delegate { "yield*" } else { "yield" });
        if let Some(arg) = &yield_expr.arg {
          self.write(" ");
          self.emit_expr(arg);
        }
      }
      Expr::Await(await_expr) => {
        self.write("await ");
        let wrap = binds_weaker_than(&await_expr.arg, UNARY, self.config);
        self.emit_wrapped(&await_expr.arg, wrap);
      }
      Expr::MetaProp(meta) => match meta.kind {
        ast::MetaPropKind::ImportMeta => self.write_mapped("import.meta", meta.span),
        ast::MetaPropKind::NewTarget => self.write_mapped("new.target", meta.span),
      },
      Expr::Paren(paren) => {
        self.write("(");
        self.emit_expr(&paren.expr);
        self.write(")");
      }
      Expr::PrivateName(name) => self.emit_private_name(name),
      Expr::OptChain(chain) => self.emit_opt_chain(chain),
      Expr::Invalid(_) => {}
      other => {
        tracing::debug!("skip unsupported expression: {:?}", other);
      }
    }
  }

  pub(crate) fn emit_wrapped(&mut self, expr: &Expr, wrap: bool) {
    if wrap {
      self.write("(");
      self.emit_expr(expr);
      self.write(")");
    } else {
      self.emit_expr(expr);
    }
  }

  /// Expression statements and arrow bodies can't start with `{`, `function` or `class`.
  pub(crate) fn emit_expr_in_statement_position(&mut self, expr: &Expr) {
    self.emit_wrapped(expr, starts_with_declaration_token(expr));
  }

  /// `a = b` and `a ? b : c`. Spaces around the operator are dropped when minifying.
  fn write_operator(&mut self, op: &str) {
    self.write_space(" ");
    self.write(op);
    self.write_space(" ");
  }

  fn emit_bin(&mut self, bin: &ast::BinExpr) {
    let config = self.config;
    // `in` is wrapped everywhere so it can't leak into a `for` initializer.
    let is_in = bin.op == BinaryOp::In;
    if is_in {
      self.write("(");
    }
    let wrap_left = operand_needs_parentheses(&bin.left, bin.op, false, config);
    self.emit_wrapped(&bin.left, wrap_left);
    if matches!(bin.op, BinaryOp::In | BinaryOp::InstanceOf) {
      self.write(" ");
      self.write(bin.op.as_str());
      self.write(" ");
    } else {
      self.write_operator(bin.op.as_str());
    }
    let wrap_right = operand_needs_parentheses(&bin.right, bin.op, true, config);
    self.emit_wrapped(&bin.right, wrap_right);
    if is_in {
      self.write(")");
    }
  }

  fn emit_callee(&mut self, callee: &Expr) {
    let wrap = binds_weaker_than(callee, CALL, self.config);
    self.emit_wrapped(callee, wrap);
  }

  fn emit_member_object(&mut self, obj: &Expr) {
    // `1..toString()` would be read as a decimal point
    let wrap = binds_weaker_than(obj, CALL, self.config)
      || matches!(obj, Expr::Lit(ast::Lit::Num(_)));
    self.emit_wrapped(obj, wrap);
  }

  fn emit_member(&mut self, member: &ast::MemberExpr, optional: bool) {
    self.emit_member_object(&member.obj);
    match &member.prop {
      ast::MemberProp::Ident(ident) => {
        self.write(if optional { "?." } else { "." });
        self.write_mapped(&ident.sym, ident.span);
      }
      ast::MemberProp::PrivateName(name) => {
        self.write(if optional { "?." } else { "." });
        self.emit_private_name(name);
      }
      ast::MemberProp::Computed(computed) => {
        if optional {
          self.write("?.");
        }
        self.write("[");
        self.emit_expr(&computed.expr);
        self.write("]");
      }
    }
  }

  fn emit_opt_chain(&mut self, chain: &ast::OptChainExpr) {
    match &*chain.base {
      ast::OptChainBase::Member(member) => self.emit_member(member, chain.optional),
      ast::OptChainBase::Call(call) => {
        self.emit_callee(&call.callee);
        if chain.optional {
          self.write("?.");
        }
        self.emit_args(&call.args);
      }
    }
  }

  pub(crate) fn emit_args(&mut self, args: &[ast::ExprOrSpread]) {
    self.write("(");
    for (idx, arg) in args.iter().enumerate() {
      if idx > 0 {
        self.write_comma();
      }
      self.emit_expr_or_spread(arg);
    }
    self.write(")");
  }

  fn emit_expr_or_spread(&mut self, arg: &ast::ExprOrSpread) {
    if arg.spread.is_some() {
      self.write("...");
    }
    self.emit_expr(&arg.expr);
  }

  fn emit_array(&mut self, array: &ast::ArrayLit) {
    self.write("[");
    let last = array.elems.len().saturating_sub(1);
    for (idx, elem) in array.elems.iter().enumerate() {
      match elem {
        Some(elem) => {
          self.emit_expr_or_spread(elem);
          if idx != last {
            self.write_comma();
          }
        }
        // A trailing hole still needs its comma
        None => {
          if idx == last {
            self.write(",");
          } else {
            self.write_comma();
          }
        }
      }
    }
    self.write("]");
  }

  fn emit_object(&mut self, object: &ast::ObjectLit) {
    if object.props.is_empty() {
      self.write("{}");
      return;
    }
    self.write("{");
    self.write_line_end();
    self.indent_level += 1;
    for (idx, prop) in object.props.iter().enumerate() {
      if idx > 0 {
        self.write(",");
        self.write_line_end();
      }
      self.write_indent();
      match prop {
        ast::PropOrSpread::Spread(spread) => {
          self.write("...");
          self.emit_expr(&spread.expr);
        }
        ast::PropOrSpread::Prop(prop) => self.emit_prop(prop),
      }
    }
    self.indent_level -= 1;
    self.write_line_end();
    self.write_indent();
    self.write("}");
  }

  fn emit_prop(&mut self, prop: &ast::Prop) {
    match prop {
      ast::Prop::Shorthand(ident) => self.emit_ident(ident),
      ast::Prop::KeyValue(kv) => {
        self.emit_prop_name(&kv.key);
        self.write(":");
        self.write_space(" ");
        self.emit_expr(&kv.value);
      }
      ast::Prop::Assign(assign) => {
        self.emit_ident(&assign.key);
        self.write_operator("=");
        self.emit_expr(&assign.value);
      }
      ast::Prop::Getter(getter) => {
        self.write("get ");
        self.emit_prop_name(&getter.key);
        self.write("()");
        self.write_space(" ");
        self.emit_optional_body(getter.body.as_ref());
      }
      ast::Prop::Setter(setter) => {
        self.write("set ");
        self.emit_prop_name(&setter.key);
        self.write("(");
        self.emit_pat(&setter.param);
        self.write(")");
        self.write_space(" ");
        self.emit_optional_body(setter.body.as_ref());
      }
      ast::Prop::Method(method) => {
        self.emit_method_head(&method.function, None);
        self.emit_prop_name(&method.key);
        self.emit_function_rest(&method.function);
      }
    }
  }

  fn emit_arrow(&mut self, arrow: &ast::ArrowExpr) {
    if arrow.is_async {
      self.write("async ");
    }
    match arrow.params.as_slice() {
      [ast::Pat::Ident(param)] if param.type_ann.is_none() => self.emit_ident(&param.id),
      params => {
        self.write("(");
        for (idx, param) in params.iter().enumerate() {
          if idx > 0 {
            self.write_comma();
          }
          self.emit_pat(param);
        }
        self.write(")");
      }
    }
    self.write_operator("=>");
    match &*arrow.body {
      ast::BlockStmtOrExpr::BlockStmt(block) => self.emit_block(block),
      ast::BlockStmtOrExpr::Expr(expr) => self.emit_expr_in_statement_position(expr),
    }
  }

  pub(crate) fn emit_assign_target(&mut self, target: &ast::AssignTarget) {
    match target {
      ast::AssignTarget::Simple(simple) => match simple {
        ast::SimpleAssignTarget::Ident(ident) => self.emit_ident(&ident.id),
        ast::SimpleAssignTarget::Member(member) => self.emit_member(member, false),
        ast::SimpleAssignTarget::SuperProp(super_prop) => {
          self.emit_expr(&Expr::SuperProp(super_prop.clone()))
        }
        ast::SimpleAssignTarget::Paren(paren) => self.emit_expr(&Expr::Paren(paren.clone())),
        ast::SimpleAssignTarget::OptChain(chain) => self.emit_opt_chain(chain),
        ast::SimpleAssignTarget::Invalid(_) => {}
        other => tracing::debug!("skip unsupported assignment target: {:?}", other),
      },
      ast::AssignTarget::Pat(pat) => match pat {
        ast::AssignTargetPat::Array(array) => self.emit_pat(&ast::Pat::Array(array.clone())),
        ast::AssignTargetPat::Object(object) => self.emit_pat(&ast::Pat::Object(object.clone())),
        ast::AssignTargetPat::Invalid(_) => {}
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::tests::{print, print_minified};

  #[test]
  fn objects_span_lines() {
    assert_eq!(print("const obj = { a: 3 };"), "const obj = {\n  a: 3\n};\n");
    assert_eq!(
      print("const obj = { a, b: { c: 1 }, ...d };"),
      "const obj = {\n  a,\n  b: {\n    c: 1\n  },\n  ...d\n};\n"
    );
    assert_eq!(print("a = {};"), "a = {};\n");
  }

  #[test]
  fn parentheses_follow_precedence() {
    assert_eq!(print("a = (b + c) * d;"), "a = (b + c) * d;\n");
    assert_eq!(print("a = b - (c - d);"), "a = b - (c - d);\n");
    assert_eq!(print("a = (b || c) ?? d;"), "a = (b || c) ?? d;\n");
    assert_eq!(print("a = (-b) ** c;"), "a = (-b) ** c;\n");
  }

  #[test]
  fn statement_position_wraps_leading_brace() {
    assert_eq!(print("({}).toString();"), "({}).toString();\n");
    assert_eq!(print("(function () {})();"), "(function () {})();\n");
  }

  #[test]
  fn arrow_bodies() {
    assert_eq!(print("f = () => ({ a: 1 });"), "f = () => ({\n  a: 1\n});\n");
    assert_eq!(print("f = x => x * 2;"), "f = x => x * 2;\n");
    assert_eq!(print("f = async (a, b) => { await a; };"), "f = async (a, b) => {\n  await a;\n};\n");
  }

  #[test]
  fn calls_and_members() {
    assert_eq!(print("new (a())();"), "new (a())();\n");
    assert_eq!(print("a?.b?.[c]?.(d);"), "a?.b?.[c]?.(d);\n");
    assert_eq!(print("(1).toString();"), "(1).toString();\n");
    assert_eq!(print("a = [1, , 2, ];"), "a = [1, , 2];\n");
    assert_eq!(print("a = [, ];"), "a = [,];\n");
  }

  #[test]
  fn in_is_always_wrapped() {
    assert_eq!(print("a = b in c;"), "a = (b in c);\n");
  }

  #[test]
  fn minify_drops_spaces_but_keeps_tokens_apart() {
    assert_eq!(print_minified("a = b + +c;"), "a=b+ +c;");
    assert_eq!(print_minified("a = b - -c;"), "a=b- -c;");
    assert_eq!(print_minified("a = typeof b;"), "a=typeof b;");
    assert_eq!(print_minified("a = b instanceof c ? d : e;"), "a=b instanceof c?d:e;");
    assert_eq!(print_minified("f(a, b);"), "f(a,b);");
  }
}
