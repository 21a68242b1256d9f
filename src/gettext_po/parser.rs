//! Recursive-descent rendition of the PO grammar:
//!
//! ```text
//! file     = { "domain" STRING | COMMENT | message } ;
//! message  = "msgid" strings
//!            ( "msgstr" strings
//!            | "msgid_plural" strings { "msgstr" "[" NUMBER "]" strings } ) ;
//! strings  = STRING { STRING } ;
//! ```
//!
//! Syntax errors are counted by the lexer and parsing resumes at the next
//! token which can start an entry.

use super::lexer::{Lexer, Token, TokenType};
use crate::builder::CatalogBuilder;
use crate::catalog::Message;
use crate::impl_prelude::*;
use crate::utils::parsing::{CharPos, ParsingError};

#[derive(Debug)]
pub struct Parser<'src> {
  lexer: Lexer<'src>,
  /// Tokens put back for re-reading, the last one is read first.
  lookahead: Vec<Token>,
}

impl<'src> Parser<'src> {
  pub fn new(lexer: Lexer<'src>) -> Self { Self { lexer, lookahead: Vec::with_capacity(2) } }

  fn next_token(&mut self, builder: &mut dyn CatalogBuilder) -> Result<Token, ParsingError> {
    match self.lookahead.pop() {
      Some(token) => Ok(token),
      None => self.lexer.next_token(builder.diagnostics()),
    }
  }

  #[inline(always)]
  fn push_back(&mut self, token: Token) { self.lookahead.push(token); }

  fn emit_error(
    &mut self,
    builder: &mut dyn CatalogBuilder,
    pos: CharPos,
    message: &str,
  ) -> Result<(), ParsingError> {
    self.lexer.emit_error(builder.diagnostics(), pos, message)
  }

  /// Feeds the whole file to the builder. Fails if the file contained any
  /// syntax errors, but only after the builder has seen everything that could
  /// be salvaged.
  pub fn parse(mut self, builder: &mut dyn CatalogBuilder) -> AnyResult<()> {
    loop {
      let token = self.next_token(builder)?;
      match token.type_ {
        TokenType::Eof => break,

        TokenType::Comment(text) => {
          builder.on_comment(&text, self.lexer.location(token.pos), token.obsolete)?;
        }

        TokenType::Domain => {
          let name_token = self.next_token(builder)?;
          if let TokenType::String(name) = &name_token.type_ {
            builder.on_domain(name, self.lexer.location(token.pos))?;
          } else {
            self.push_back(name_token);
            self.recover_from_syntax_error(builder)?;
          }
        }

        TokenType::Msgid => self.parse_message(token.pos, token.obsolete, builder)?,

        _ => {
          self.push_back(token);
          self.recover_from_syntax_error(builder)?;
        }
      }
    }

    builder.on_finish()?;

    let error_count = self.lexer.error_count();
    if error_count > 0 {
      bail!(
        "found {} fatal {} in {:?}",
        error_count,
        if error_count == 1 { "error" } else { "errors" },
        self.lexer.file_name(),
      );
    }
    Ok(())
  }

  /// Reports the next token as unexpected and skips tokens until one which
  /// can start an entry.
  fn recover_from_syntax_error(&mut self, builder: &mut dyn CatalogBuilder) -> AnyResult<()> {
    let mut token = self.next_token(builder)?;
    self.emit_error(builder, token.pos, "syntax error")?;
    loop {
      match token.type_ {
        TokenType::Msgid | TokenType::Domain | TokenType::Comment(_) | TokenType::Eof => {
          self.push_back(token);
          return Ok(());
        }
        _ => token = self.next_token(builder)?,
      }
    }
  }

  fn parse_message(
    &mut self,
    pos: CharPos,
    obsolete: bool,
    builder: &mut dyn CatalogBuilder,
  ) -> AnyResult<()> {
    let mut consistency = ObsoleteConsistency::new(obsolete);

    let msgid = match self.parse_strings(builder, &mut consistency)? {
      Some(msgid) => msgid,
      None => return self.recover_from_syntax_error(builder),
    };

    let token = self.next_token(builder)?;
    consistency.check(&token);
    let mut message = match token.type_ {
      TokenType::Msgstr => {
        let following = self.next_token(builder)?;
        let is_plural_form = following.type_ == TokenType::LeftBracket;
        self.push_back(following);
        if is_plural_form {
          self.push_back(token);
          if self.parse_plural_forms(builder, &mut consistency)?.is_none() {
            return self.recover_from_syntax_error(builder);
          }
          self.emit_error(builder, pos, "missing 'msgid_plural' section")?;
          return Ok(());
        }
        match self.parse_strings(builder, &mut consistency)? {
          Some(msgstr) => Message::new(msgid, msgstr),
          None => return self.recover_from_syntax_error(builder),
        }
      }

      TokenType::MsgidPlural => {
        let msgid_plural = match self.parse_strings(builder, &mut consistency)? {
          Some(msgid_plural) => msgid_plural,
          None => return self.recover_from_syntax_error(builder),
        };
        let forms = match self.parse_plural_forms(builder, &mut consistency)? {
          Some(forms) => forms,
          None => return self.recover_from_syntax_error(builder),
        };
        if forms.is_empty() {
          self.emit_error(builder, pos, "missing 'msgstr[]' section")?;
          return Ok(());
        }
        Message::new_plural(msgid, msgid_plural, forms)
      }

      _ => {
        self.push_back(token);
        self.emit_error(builder, pos, "missing 'msgstr' section")?;
        return Ok(());
      }
    };

    if consistency.is_broken {
      self.emit_error(builder, pos, "inconsistent use of #~")?;
    }

    message.is_obsolete = obsolete;
    message.pos = Some(self.lexer.location(pos));
    if message.is_header() {
      self.lexer.switch_charset_from_header(&message.msgstr[0], pos, builder.diagnostics());
    }
    builder.on_message(message)
  }

  /// Concatenates consecutive string literals. Returns `None`, leaving the
  /// offending token unread, if there isn't a single one.
  fn parse_strings(
    &mut self,
    builder: &mut dyn CatalogBuilder,
    consistency: &mut ObsoleteConsistency,
  ) -> Result<Option<Vec<u8>>, ParsingError> {
    let mut text: Option<Vec<u8>> = None;
    loop {
      let token = self.next_token(builder)?;
      if let TokenType::String(s) = &token.type_ {
        consistency.check(&token);
        text.get_or_insert_with(Vec::new).extend_from_slice(s);
      } else {
        self.push_back(token);
        return Ok(text);
      }
    }
  }

  /// Reads `msgstr[N]` sections for as long as they follow. Returns `None`,
  /// leaving the offending token unread, on a malformed section.
  fn parse_plural_forms(
    &mut self,
    builder: &mut dyn CatalogBuilder,
    consistency: &mut ObsoleteConsistency,
  ) -> AnyResult<Option<Vec<Vec<u8>>>> {
    let mut forms = Vec::new();
    loop {
      let token = self.next_token(builder)?;
      if token.type_ != TokenType::Msgstr {
        self.push_back(token);
        return Ok(Some(forms));
      }
      consistency.check(&token);

      let token = self.next_token(builder)?;
      if token.type_ != TokenType::LeftBracket {
        self.push_back(token);
        return Ok(None);
      }
      consistency.check(&token);

      let token = self.next_token(builder)?;
      let index = match token.type_ {
        TokenType::Number(index) => index,
        _ => {
          self.push_back(token);
          return Ok(None);
        }
      };
      consistency.check(&token);
      let index_pos = token.pos;

      let token = self.next_token(builder)?;
      if token.type_ != TokenType::RightBracket {
        self.push_back(token);
        return Ok(None);
      }
      consistency.check(&token);

      if index != forms.len() as u64 {
        let message = if forms.is_empty() {
          "first plural form has nonzero index"
        } else {
          "plural form has wrong index"
        };
        self.emit_error(builder, index_pos, message)?;
      }

      match self.parse_strings(builder, consistency)? {
        Some(text) => forms.push(text),
        None => return Ok(None),
      }
    }
  }
}

/// Tracks whether all tokens of an entry agree on being obsolete.
#[derive(Debug)]
struct ObsoleteConsistency {
  obsolete: bool,
  is_broken: bool,
}

impl ObsoleteConsistency {
  fn new(obsolete: bool) -> Self { Self { obsolete, is_broken: false } }

  #[inline]
  fn check(&mut self, token: &Token) {
    if token.obsolete != self.obsolete {
      self.is_broken = true;
    }
  }
}
