use swc_core::ecma::ast::{self, Stmt};

use crate::{
  precedence::{binds_weaker_than, CALL},
  CodeGen,
};

impl<'a> CodeGen<'a> {
  pub(crate) fn emit_stmt(&mut self, stmt: &Stmt) {
    match stmt {
      Stmt::Block(block) => self.emit_block(block),
      Stmt::Empty(_) => self.write(";"),
      Stmt::Debugger(_) => self.write("debugger;"),
      Stmt::With(with) => {
        self.write("with");
        self.write_space(" ");
        self.write("(");
        self.emit_expr(&with.obj);
        self.write(")");
        self.write_space(" ");
        self.emit_stmt(&with.body);
      }
      Stmt::Return(ret) => {
        self.write("return");
        if let Some(arg) = &ret.arg {
          self.write(" ");
          self.emit_expr(arg);
        }
        self.write(";");
      }
      Stmt::Labeled(labeled) => {
        self.write(&labeled.label.sym);
        self.write(":");
        self.write_space(" ");
        self.emit_stmt(&labeled.body);
      }
      Stmt::Break(brk) => {
        self.write("break");
        if let Some(label) = &brk.label {
          self.write(" ");
          self.write(&label.sym);
        }
        self.write(";");
      }
      Stmt::Continue(cont) => {
        self.write("continue");
        if let Some(label) = &cont.label {
          self.write(" ");
          self.write(&label.sym);
        }
        self.write(";");
      }
      Stmt::If(if_stmt) => {
        self.write("if");
        self.write_space(" ");
        self.write("(");
        self.emit_expr(&if_stmt.test);
        self.write(")");
        self.write_space(" ");
        self.emit_stmt(&if_stmt.cons);
        if let Some(alt) = &if_stmt.alt {
          self.write_space(" ");
          self.write("else");
          self.write_space(" ");
          self.emit_stmt(alt);
        }
      }
      Stmt::Switch(switch) => {
        self.write("switch");
        self.write_space(" ");
        self.write("(");
        self.emit_expr(&switch.discriminant);
        self.write(")");
        self.write_space(" ");
        self.write("{");
        self.write_line_end();
        self.indent_level += 1;
        for case in &switch.cases {
          self.write_indent();
          match &case.test {
            Some(test) => {
              self.write("case ");
              self.emit_expr(test);
              self.write(":");
            }
            None => self.write("default:"),
          }
          self.write_line_end();
          self.indent_level += 1;
          for stmt in &case.cons {
            self.write_indent();
            self.emit_stmt(stmt);
            self.write_line_end();
          }
          self.indent_level -= 1;
        }
        self.indent_level -= 1;
        self.write_indent();
        self.write("}");
      }
      Stmt::Throw(throw) => {
        self.write("throw ");
        self.emit_expr(&throw.arg);
        self.write(";");
      }
      Stmt::Try(try_stmt) => {
        self.write("try");
        self.write_space(" ");
        self.emit_block(&try_stmt.block);
        if let Some(handler) = &try_stmt.handler {
          self.write_space(" ");
          self.write("catch");
          self.write_space(" ");
          if let Some(param) = &handler.param {
            self.write("(");
            self.emit_pat(param);
            self.write(")");
            self.write_space(" ");
          }
          self.emit_block(&handler.body);
        }
        if let Some(finalizer) = &try_stmt.finalizer {
          self.write_space(" ");
          self.write("finally");
          self.write_space(" ");
          self.emit_block(finalizer);
        }
      }
      Stmt::While(while_stmt) => {
        self.write("while");
        self.write_space(" ");
        self.write("(");
        self.emit_expr(&while_stmt.test);
        self.write(")");
        self.write_space(" ");
        self.emit_stmt(&while_stmt.body);
      }
      Stmt::DoWhile(do_while) => {
        self.write("do");
        self.write_space(" ");
        self.emit_stmt(&do_while.body);
        self.write_space(" ");
        self.write("while");
        self.write_space(" ");
        self.write("(");
        self.emit_expr(&do_while.test);
        self.write(");");
      }
      Stmt::For(for_stmt) => {
        self.write("for");
        self.write_space(" ");
        self.write("(");
        match &for_stmt.init {
          Some(ast::VarDeclOrExpr::VarDecl(var)) => self.emit_var_decl(var),
          Some(ast::VarDeclOrExpr::Expr(expr)) => self.emit_expr(expr),
          None => {}
        }
        self.write(";");
        if let Some(test) = &for_stmt.test {
          self.write_space(" ");
          self.emit_expr(test);
        }
        self.write(";");
        if let Some(update) = &for_stmt.update {
          self.write_space(" ");
          self.emit_expr(update);
        }
        self.write(")");
        self.write_space(" ");
        self.emit_stmt(&for_stmt.body);
      }
      Stmt::ForIn(for_in) => {
        self.write("for");
        self.write_space(" ");
        self.write("(");
        self.emit_for_head(&for_in.left);
        self.write(" in ");
        self.emit_expr(&for_in.right);
        self.write(")");
        self.write_space(" ");
        self.emit_stmt(&for_in.body);
      }
      Stmt::ForOf(for_of) => {
        self.write(if for_of.is_await { "for await" } else { "for" });
        self.write_space(" ");
        self.write("(");
        self.emit_for_head(&for_of.left);
        self.write(" of ");
        self.emit_expr(&for_of.right);
        self.write(")");
        self.write_space(" ");
        self.emit_stmt(&for_of.body);
      }
      Stmt::Decl(decl) => self.emit_decl(decl),
      Stmt::Expr(expr_stmt) => {
        self.emit_expr_in_statement_position(&expr_stmt.expr);
        self.write(";");
      }
    }
  }

  pub(crate) fn emit_decl(&mut self, decl: &ast::Decl) {
    match decl {
      ast::Decl::Class(class) => self.emit_class(Some(&class.ident), &class.class),
      ast::Decl::Fn(func) => self.emit_function(Some(&func.ident), &func.function),
      ast::Decl::Var(var) => {
        self.emit_var_decl(var);
        self.write(";");
      }
      ast::Decl::Using(using) => {
        self.emit_using_decl(using);
        self.write(";");
      }
      other => tracing::debug!("skip unsupported declaration: {:?}", other),
    }
  }

  pub(crate) fn emit_block(&mut self, block: &ast::BlockStmt) {
    self.write("{");
    if !block.stmts.is_empty() {
      self.write_line_end();
      self.indent_level += 1;
      for stmt in &block.stmts {
        self.write_indent();
        self.emit_stmt(stmt);
        self.write_line_end();
      }
      self.indent_level -= 1;
      self.write_indent();
    }
    self.write("}");
  }

  pub(crate) fn emit_optional_body(&mut self, body: Option<&ast::BlockStmt>) {
    match body {
      Some(body) => self.emit_block(body),
      None => self.write("{}"),
    }
  }

  /// `var a = 1, b` without the trailing semicolon.
  fn emit_var_decl(&mut self, var: &ast::VarDecl) {
    self.write(match var.kind {
      ast::VarDeclKind::Var => "var ",
      ast::VarDeclKind::Let => "let ",
      ast::VarDeclKind::Const => "const ",
    });
    self.emit_declarators(&var.decls);
  }

  fn emit_using_decl(&mut self, using: &ast::UsingDecl) {
    self.write(if using.is_await { "await using " } else { "using " });
    self.emit_declarators(&using.decls);
  }

  fn emit_declarators(&mut self, decls: &[ast::VarDeclarator]) {
    for (idx, decl) in decls.iter().enumerate() {
      if idx > 0 {
        self.write_comma();
      }
      self.emit_pat(&decl.name);
      if let Some(init) = &decl.init {
        self.write_space(" ");
        self.write("=");
        self.write_space(" ");
        self.emit_expr(init);
      }
    }
  }

  fn emit_for_head(&mut self, head: &ast::ForHead) {
    match head {
      ast::ForHead::VarDecl(var) => self.emit_var_decl(var),
      ast::ForHead::UsingDecl(using) => self.emit_using_decl(using),
      ast::ForHead::Pat(pat) => self.emit_pat(pat),
    }
  }

  pub(crate) fn emit_function(&mut self, ident: Option<&ast::Ident>, function: &ast::Function) {
    if function.is_async {
      self.write("async ");
    }
    self.write("function");
    if function.is_generator {
      self.write("*");
    }
    match ident {
      Some(ident) => {
        self.write(" ");
        self.emit_ident(ident);
      }
      None => self.write_space(" "),
    }
    self.emit_function_rest(function);
  }

  /// `async` and `*` of methods, `static` for class members.
  pub(crate) fn emit_method_head(&mut self, function: &ast::Function, is_static: Option<bool>) {
    if is_static == Some(true) {
      self.write("static ");
    }
    if function.is_async {
      self.write("async ");
    }
    if function.is_generator {
      self.write("*");
    }
  }

  /// Parameters and body.
  pub(crate) fn emit_function_rest(&mut self, function: &ast::Function) {
    self.write("(");
    for (idx, param) in function.params.iter().enumerate() {
      if idx > 0 {
        self.write_comma();
      }
      self.emit_pat(&param.pat);
    }
    self.write(")");
    self.write_space(" ");
    self.emit_optional_body(function.body.as_ref());
  }

  pub(crate) fn emit_class(&mut self, ident: Option<&ast::Ident>, class: &ast::Class) {
    self.write("class");
    if let Some(ident) = ident {
      self.write(" ");
      self.emit_ident(ident);
    }
    if let Some(super_class) = &class.super_class {
      self.write(" extends ");
      let wrap = binds_weaker_than(super_class, CALL, self.config);
      self.emit_wrapped(super_class, wrap);
    }
    self.write_space(" ");
    self.write("{");
    if class.body.is_empty() {
      self.write("}");
      return;
    }
    self.write_line_end();
    self.indent_level += 1;
    for member in &class.body {
      self.write_indent();
      self.emit_class_member(member);
      self.write_line_end();
    }
    self.indent_level -= 1;
    self.write_indent();
    self.write("}");
  }

  fn emit_class_member(&mut self, member: &ast::ClassMember) {
    match member {
      ast::ClassMember::Constructor(constructor) => {
        self.write("constructor(");
        for (idx, param) in constructor.params.iter().enumerate() {
          if idx > 0 {
            self.write_comma();
          }
          if let ast::ParamOrTsParamProp::Param(param) = param {
            self.emit_pat(&param.pat);
          }
        }
        self.write(")");
        self.write_space(" ");
        self.emit_optional_body(constructor.body.as_ref());
      }
      ast::ClassMember::Method(method) => {
        self.emit_method_head(&method.function, Some(method.is_static));
        self.write_method_kind(method.kind);
        self.emit_prop_name(&method.key);
        self.emit_function_rest(&method.function);
      }
      ast::ClassMember::PrivateMethod(method) => {
        self.emit_method_head(&method.function, Some(method.is_static));
        self.write_method_kind(method.kind);
        self.emit_private_name(&method.key);
        self.emit_function_rest(&method.function);
      }
      ast::ClassMember::ClassProp(prop) => {
        if prop.is_static {
          self.write("static ");
        }
        self.emit_prop_name(&prop.key);
        self.emit_class_prop_value(prop.value.as_deref());
      }
      ast::ClassMember::PrivateProp(prop) => {
        if prop.is_static {
          self.write("static ");
        }
        self.emit_private_name(&prop.key);
        self.emit_class_prop_value(prop.value.as_deref());
      }
      ast::ClassMember::StaticBlock(block) => {
        self.write("static");
        self.write_space(" ");
        self.emit_block(&block.body);
      }
      ast::ClassMember::Empty(_) => self.write(";"),
      other => tracing::debug!("skip unsupported class member: {:?}", other),
    }
  }

  fn write_method_kind(&mut self, kind: ast::MethodKind) {
    match kind {
      ast::MethodKind::Method => {}
      ast::MethodKind::Getter => self.write("get "),
      ast::MethodKind::Setter => self.write("set "),
    }
  }

  fn emit_class_prop_value(&mut self, value: Option<&ast::Expr>) {
    if let Some(value) = value {
      self.write_space(" ");
      self.write("=");
      self.write_space(" ");
      self.emit_expr(value);
    }
    self.write(";");
  }

  pub(crate) fn emit_pat(&mut self, pat: &ast::Pat) {
    match pat {
      ast::Pat::Ident(binding) => self.emit_ident(&binding.id),
      ast::Pat::Array(array) => {
        self.write("[");
        let last = array.elems.len().saturating_sub(1);
        for (idx, elem) in array.elems.iter().enumerate() {
          if let Some(elem) = elem {
            self.emit_pat(elem);
          }
          if idx != last {
            self.write_comma();
          } else if elem.is_none() {
            self.write(",");
          }
        }
        self.write("]");
      }
      ast::Pat::Rest(rest) => {
        self.write("...");
        self.emit_pat(&rest.arg);
      }
      ast::Pat::Object(object) => {
        if object.props.is_empty() {
          self.write("{}");
          return;
        }
        self.write("{");
        self.write_space(" ");
        for (idx, prop) in object.props.iter().enumerate() {
          if idx > 0 {
            self.write_comma();
          }
          match prop {
            ast::ObjectPatProp::KeyValue(kv) => {
              self.emit_prop_name(&kv.key);
              self.write(":");
              self.write_space(" ");
              self.emit_pat(&kv.value);
            }
            ast::ObjectPatProp::Assign(assign) => {
              self.emit_ident(&assign.key.id);
              if let Some(value) = &assign.value {
                self.write_space(" ");
                self.write("=");
                self.write_space(" ");
                self.emit_expr(value);
              }
            }
            ast::ObjectPatProp::Rest(rest) => {
              self.write("...");
              self.emit_pat(&rest.arg);
            }
          }
        }
        self.write_space(" ");
        self.write("}");
      }
      ast::Pat::Assign(assign) => {
        self.emit_pat(&assign.left);
        self.write_space(" ");
        self.write("=");
        self.write_space(" ");
        self.emit_expr(&assign.right);
      }
      ast::Pat::Expr(expr) => self.emit_expr(expr),
      ast::Pat::Invalid(_) => {}
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::tests::{print, print_minified};

  #[test]
  fn declarations() {
    assert_eq!(print("export const a = 3;"), "export const a = 3;\n");
    assert_eq!(print("var { a, b } = f();"), "var { a, b } = f();\n");
    assert_eq!(print("let [x, , ...y] = z;"), "let [x, , ...y] = z;\n");
    assert_eq!(print("async function* g(a = 1) {}"), "async function* g(a = 1) {}\n");
  }

  #[test]
  fn control_flow() {
    assert_eq!(
      print("if (a) b(); else { c(); }"),
      "if (a) b(); else {\n  c();\n}\n"
    );
    assert_eq!(
      print("for (let i = 0; i < n; i++) { if (i) continue; }"),
      "for (let i = 0; i < n; i++) {\n  if (i) continue;\n}\n"
    );
    assert_eq!(print("for (const k in o) f(k);"), "for (const k in o) f(k);\n");
    assert_eq!(
      print("try { a(); } catch (e) { b(e); } finally { c(); }"),
      "try {\n  a();\n} catch (e) {\n  b(e);\n} finally {\n  c();\n}\n"
    );
    assert_eq!(
      print("switch (a) { case 1: b(); break; default: c(); }"),
      "switch (a) {\n  case 1:\n    b();\n    break;\n  default:\n    c();\n}\n"
    );
    assert_eq!(print("do x(); while (y);"), "do x(); while (y);\n");
    assert_eq!(print("out: while (a) break out;"), "out: while (a) break out;\n");
  }

  #[test]
  fn classes() {
    assert_eq!(
      print("class A extends B { static x = 1; #y; constructor(a) { super(a); } get z() { return this.#y; } }"),
      "class A extends B {\n  static x = 1;\n  #y;\n  constructor(a) {\n    super(a);\n  }\n  get z() {\n    return this.#y;\n  }\n}\n"
    );
  }

  #[test]
  fn minified_statements() {
    assert_eq!(
      print_minified("function f(a) { if (a) { return a; } else return 1; }"),
      "function f(a){if(a){return a;}else return 1;}"
    );
    assert_eq!(print_minified("let a = 1, b = 2;"), "let a=1,b=2;");
  }
}
