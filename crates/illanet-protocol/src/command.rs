//! Client → server commands.
//!
//! A [`Command`] is built by application code, handed to the connection
//! layer, encoded once and discarded. Like [`ServerMessage`](crate::ServerMessage)
//! it is a closed enum, so the id lookup and the encoder are plain `match`es.

use crate::ids::{
    CMD_CLOSE_DIALOG_CRAFTING, CMD_CRAFT_ITEM, CMD_KEEPALIVE, CMD_LOGIN, CMD_LOGOFF,
    CMD_LOOKAT_CRAFT_INGREDIENT, CMD_LOOKAT_CRAFT_ITEM,
};
use crate::{CommandId, NetWriter, ProtocolError};

/// An outbound protocol request.
#[derive(Clone, PartialEq, Eq)]
pub enum Command {
    /// Log a character in. Sent right after the socket connects.
    Login {
        character: String,
        password: String,
        client_version: u8,
    },
    /// Log the character out before closing the connection.
    Logoff,
    /// Keeps an idle connection from being dropped by the server.
    KeepAlive,
    CloseDialogCrafting {
        dialog_id: i32,
    },
    CraftItem {
        dialog_id: i32,
        craft_id: u8,
        amount: u8,
    },
    /// Ask for the tooltip of a craftable item; answered with
    /// `MSG_LOOKAT_DIALOG_ITEM` type 0.
    LookAtCraftItem {
        dialog_id: i32,
        craft_id: u8,
    },
    /// Ask for the tooltip of an ingredient; answered with type 1.
    LookAtCraftIngredient {
        dialog_id: i32,
        craft_id: u8,
        ingredient: u8,
    },
}

impl Command {
    pub fn id(&self) -> CommandId {
        match self {
            Self::Login { .. } => CMD_LOGIN,
            Self::Logoff => CMD_LOGOFF,
            Self::KeepAlive => CMD_KEEPALIVE,
            Self::CloseDialogCrafting { .. } => CMD_CLOSE_DIALOG_CRAFTING,
            Self::CraftItem { .. } => CMD_CRAFT_ITEM,
            Self::LookAtCraftItem { .. } => CMD_LOOKAT_CRAFT_ITEM,
            Self::LookAtCraftIngredient { .. } => CMD_LOOKAT_CRAFT_INGREDIENT,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Login { .. } => "Login",
            Self::Logoff => "Logoff",
            Self::KeepAlive => "KeepAlive",
            Self::CloseDialogCrafting { .. } => "CloseDialogCrafting",
            Self::CraftItem { .. } => "CraftItem",
            Self::LookAtCraftItem { .. } => "LookAtCraftItem",
            Self::LookAtCraftIngredient { .. } => "LookAtCraftIngredient",
        }
    }

    /// Encodes the command as a complete frame: id byte, then payload.
    ///
    /// # Errors
    /// [`ProtocolError::StringTooLong`] if a text field exceeds 65535 bytes.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        let mut w = NetWriter::with_capacity(16);
        w.write_u8(self.id());
        match self {
            Self::Login {
                character,
                password,
                client_version,
            } => {
                w.write_u8(*client_version);
                w.write_string(character)?;
                w.write_string(password)?;
            }
            Self::Logoff | Self::KeepAlive => {}
            Self::CloseDialogCrafting { dialog_id } => w.write_i32(*dialog_id),
            Self::CraftItem {
                dialog_id,
                craft_id,
                amount,
            } => {
                w.write_i32(*dialog_id);
                w.write_u8(*craft_id);
                w.write_u8(*amount);
            }
            Self::LookAtCraftItem {
                dialog_id,
                craft_id,
            } => {
                w.write_i32(*dialog_id);
                w.write_u8(*craft_id);
            }
            Self::LookAtCraftIngredient {
                dialog_id,
                craft_id,
                ingredient,
            } => {
                w.write_i32(*dialog_id);
                w.write_u8(*craft_id);
                w.write_u8(*ingredient);
            }
        }
        Ok(w.into_vec())
    }
}

// Hand-written so passwords never end up in log output.
impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Login {
                character,
                client_version,
                ..
            } => f
                .debug_struct("Login")
                .field("character", character)
                .field("password", &"<redacted>")
                .field("client_version", client_version)
                .finish(),
            Self::Logoff => f.write_str("Logoff"),
            Self::KeepAlive => f.write_str("KeepAlive"),
            Self::CloseDialogCrafting { dialog_id } => f
                .debug_struct("CloseDialogCrafting")
                .field("dialog_id", dialog_id)
                .finish(),
            Self::CraftItem {
                dialog_id,
                craft_id,
                amount,
            } => f
                .debug_struct("CraftItem")
                .field("dialog_id", dialog_id)
                .field("craft_id", craft_id)
                .field("amount", amount)
                .finish(),
            Self::LookAtCraftItem {
                dialog_id,
                craft_id,
            } => f
                .debug_struct("LookAtCraftItem")
                .field("dialog_id", dialog_id)
                .field("craft_id", craft_id)
                .finish(),
            Self::LookAtCraftIngredient {
                dialog_id,
                craft_id,
                ingredient,
            } => f
                .debug_struct("LookAtCraftIngredient")
                .field("dialog_id", dialog_id)
                .field("craft_id", craft_id)
                .field("ingredient", ingredient)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NetReader;

    #[test]
    fn test_login_encoding_layout() {
        let cmd = Command::Login {
            character: "Ada".into(),
            password: "pw".into(),
            client_version: 122,
        };

        let frame = cmd.encode().unwrap();

        let mut r = NetReader::new(&frame);
        assert_eq!(r.read_u8().unwrap(), CMD_LOGIN);
        assert_eq!(r.read_u8().unwrap(), 122);
        assert_eq!(r.read_string().unwrap(), "Ada");
        assert_eq!(r.read_string().unwrap(), "pw");
        assert!(r.is_empty());
    }

    #[test]
    fn test_payloadless_commands_are_one_byte() {
        assert_eq!(Command::Logoff.encode().unwrap(), vec![CMD_LOGOFF]);
        assert_eq!(Command::KeepAlive.encode().unwrap(), vec![CMD_KEEPALIVE]);
    }

    #[test]
    fn test_craft_item_encoding() {
        let frame = Command::CraftItem {
            dialog_id: 7,
            craft_id: 3,
            amount: 10,
        }
        .encode()
        .unwrap();
        assert_eq!(frame, vec![CMD_CRAFT_ITEM, 0, 0, 0, 7, 3, 10]);
    }

    #[test]
    fn test_debug_redacts_password() {
        let cmd = Command::Login {
            character: "Ada".into(),
            password: "hunter2".into(),
            client_version: 1,
        };
        let rendered = format!("{cmd:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("Ada"));
    }

    #[test]
    fn test_overlong_password_is_rejected() {
        let cmd = Command::Login {
            character: "Ada".into(),
            password: "x".repeat(u16::MAX as usize + 1),
            client_version: 1,
        };
        assert!(matches!(
            cmd.encode(),
            Err(ProtocolError::StringTooLong { .. })
        ));
    }
}
