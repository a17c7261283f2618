//! Long poll command codes.
//!
//! Every long poll is identified by the second byte of the frame. This module
//! defines the closed set of codes the registry knows how to answer, grouped
//! the way the host uses them.
//!
//! ```text
//! [address][code][payload...][crc lo][crc hi]
//!          ^^^^^^
//!          LongPollCode
//! ```
//!
//! # Usage
//!
//! ```
//! use sas_protocol::LongPollCode;
//!
//! let code = LongPollCode::from_u8(0x1F).unwrap();
//! assert_eq!(code, LongPollCode::SendMachineIdInformation);
//! assert_eq!(code.as_u8(), 0x1F);
//! assert!(code.is_game_information());
//!
//! // Unassigned codes are rejected
//! assert!(LongPollCode::from_u8(0x0C).is_err());
//! ```
//!
//! # Frame types
//!
//! Read-only polls without request data (type R) are sent without a CRC.
//! Everything else (type S and type M) carries one; see
//! [`LongPollCode::has_crc`].

use serde::{Deserialize, Serialize};
use std::fmt;
use sas_core::{Error, Result};

/// Command codes for long polls.
///
/// Each variant's discriminant is its wire byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum LongPollCode {
    Shutdown = 0x01,
    Startup = 0x02,
    SoundOff = 0x03,
    SoundOn = 0x04,
    GameSoundsDisable = 0x05,
    EnableBillAcceptor = 0x06,
    DisableBillAcceptor = 0x07,
    ConfigureBillDenominations = 0x08,
    EnableDisableGameN = 0x09,
    EnterMaintenanceMode = 0x0A,
    ExitMaintenanceMode = 0x0B,
    EnableRealTimeEvents = 0x0E,
    SendMeters10To15 = 0x0F,
    SendCancelledCreditsMeter = 0x10,
    SendCoinInMeter = 0x11,
    SendCoinOutMeter = 0x12,
    SendDropMeter = 0x13,
    SendJackpotMeter = 0x14,
    SendGamesPlayedMeter = 0x15,
    SendGamesWonMeter = 0x16,
    SendGamesLostMeter = 0x17,
    SendGamesSincePowerUp = 0x18,
    SendMeters11To15 = 0x19,
    SendCurrentCredits = 0x1A,
    SendHandpayInformation = 0x1B,
    SendMeters = 0x1C,
    SendBillMeters = 0x1E,
    SendMachineIdInformation = 0x1F,
    SendTotalBillsMeter = 0x20,
    RomSignatureVerification = 0x21,
    SendTrueCoinInMeter = 0x2A,
    SendTrueCoinOutMeter = 0x2B,
    SendHopperLevel = 0x2C,
    SendHandPaidCancelledCredits = 0x2D,
    DelayGame = 0x2E,
    SendSelectedMetersForGameN = 0x2F,
    SendOneDollarBillsMeter = 0x31,
    SendTwoDollarBillsMeter = 0x32,
    SendFiveDollarBillsMeter = 0x33,
    SendTenDollarBillsMeter = 0x34,
    SendTwentyDollarBillsMeter = 0x35,
    SendFiftyDollarBillsMeter = 0x36,
    SendHundredDollarBillsMeter = 0x37,
    SendFiveHundredDollarBillsMeter = 0x38,
    SendThousandDollarBillsMeter = 0x39,
    SendTwoHundredDollarBillsMeter = 0x3A,
    SendCashOutTicketInformation = 0x3D,
    SendLastAcceptedBill = 0x48,
    SetSecureEnhancedValidationId = 0x4C,
    SendEnhancedValidationInformation = 0x4D,
    SendValidationMeters = 0x50,
    SendNumberOfGames = 0x51,
    SendGameNMeters = 0x52,
    SendGameNConfiguration = 0x53,
    SendVersionAndSerialNumber = 0x54,
    SendSelectedGameNumber = 0x55,
    SendEnabledGameNumbers = 0x56,
    SendPendingCashoutInformation = 0x57,
    ReceiveValidationNumber = 0x58,
    SendExtendedMetersForGameN = 0x6F,
    SendTicketValidationData = 0x70,
    RedeemTicket = 0x71,
    AftTransferFunds = 0x72,
    AftRegisterGamingMachine = 0x73,
    AftGameLockAndStatus = 0x74,
    SetAftReceiptData = 0x75,
    ExtendedValidationStatus = 0x7B,
    SetExtendedTicketData = 0x7C,
    SetTicketData = 0x7D,
    SendDateTime = 0x7E,
    ReceiveDateTime = 0x7F,
    ReceiveProgressiveAmount = 0x80,
    SendCumulativeProgressiveWins = 0x83,
    SendProgressiveWinAmount = 0x84,
    SendSasProgressiveWinAmount = 0x85,
    ReceiveMultipleProgressiveLevels = 0x86,
    SendMultipleSasProgressiveWins = 0x87,
    InitiateLegacyBonusPay = 0x8A,
    SendCardInformation = 0x8E,
    SendReelStopInformation = 0x8F,
    RemoteHandpayReset = 0x94,
    SendEnabledFeatures = 0xA0,
    SendCashOutLimit = 0xA4,
    EnableJackpotHandpayResetMethod = 0xA8,
    EnableAutoRebet = 0xAA,
    SendExtendedMetersForGameNAlt = 0xAF,
    MultiDenomPreamble = 0xB0,
    SendCurrentPlayerDenomination = 0xB1,
    SendEnabledPlayerDenominations = 0xB2,
    SendTokenDenomination = 0xB3,
    SendWagerCategoryInformation = 0xB4,
    SendExtendedGameInformation = 0xB5,
    SetMachineNumbers = 0xB7,
}

impl LongPollCode {
    /// Every supported code in ascending wire order.
    pub const ALL: [LongPollCode; 93] = [
        Self::Shutdown,
        Self::Startup,
        Self::SoundOff,
        Self::SoundOn,
        Self::GameSoundsDisable,
        Self::EnableBillAcceptor,
        Self::DisableBillAcceptor,
        Self::ConfigureBillDenominations,
        Self::EnableDisableGameN,
        Self::EnterMaintenanceMode,
        Self::ExitMaintenanceMode,
        Self::EnableRealTimeEvents,
        Self::SendMeters10To15,
        Self::SendCancelledCreditsMeter,
        Self::SendCoinInMeter,
        Self::SendCoinOutMeter,
        Self::SendDropMeter,
        Self::SendJackpotMeter,
        Self::SendGamesPlayedMeter,
        Self::SendGamesWonMeter,
        Self::SendGamesLostMeter,
        Self::SendGamesSincePowerUp,
        Self::SendMeters11To15,
        Self::SendCurrentCredits,
        Self::SendHandpayInformation,
        Self::SendMeters,
        Self::SendBillMeters,
        Self::SendMachineIdInformation,
        Self::SendTotalBillsMeter,
        Self::RomSignatureVerification,
        Self::SendTrueCoinInMeter,
        Self::SendTrueCoinOutMeter,
        Self::SendHopperLevel,
        Self::SendHandPaidCancelledCredits,
        Self::DelayGame,
        Self::SendSelectedMetersForGameN,
        Self::SendOneDollarBillsMeter,
        Self::SendTwoDollarBillsMeter,
        Self::SendFiveDollarBillsMeter,
        Self::SendTenDollarBillsMeter,
        Self::SendTwentyDollarBillsMeter,
        Self::SendFiftyDollarBillsMeter,
        Self::SendHundredDollarBillsMeter,
        Self::SendFiveHundredDollarBillsMeter,
        Self::SendThousandDollarBillsMeter,
        Self::SendTwoHundredDollarBillsMeter,
        Self::SendCashOutTicketInformation,
        Self::SendLastAcceptedBill,
        Self::SetSecureEnhancedValidationId,
        Self::SendEnhancedValidationInformation,
        Self::SendValidationMeters,
        Self::SendNumberOfGames,
        Self::SendGameNMeters,
        Self::SendGameNConfiguration,
        Self::SendVersionAndSerialNumber,
        Self::SendSelectedGameNumber,
        Self::SendEnabledGameNumbers,
        Self::SendPendingCashoutInformation,
        Self::ReceiveValidationNumber,
        Self::SendExtendedMetersForGameN,
        Self::SendTicketValidationData,
        Self::RedeemTicket,
        Self::AftTransferFunds,
        Self::AftRegisterGamingMachine,
        Self::AftGameLockAndStatus,
        Self::SetAftReceiptData,
        Self::ExtendedValidationStatus,
        Self::SetExtendedTicketData,
        Self::SetTicketData,
        Self::SendDateTime,
        Self::ReceiveDateTime,
        Self::ReceiveProgressiveAmount,
        Self::SendCumulativeProgressiveWins,
        Self::SendProgressiveWinAmount,
        Self::SendSasProgressiveWinAmount,
        Self::ReceiveMultipleProgressiveLevels,
        Self::SendMultipleSasProgressiveWins,
        Self::InitiateLegacyBonusPay,
        Self::SendCardInformation,
        Self::SendReelStopInformation,
        Self::RemoteHandpayReset,
        Self::SendEnabledFeatures,
        Self::SendCashOutLimit,
        Self::EnableJackpotHandpayResetMethod,
        Self::EnableAutoRebet,
        Self::SendExtendedMetersForGameNAlt,
        Self::MultiDenomPreamble,
        Self::SendCurrentPlayerDenomination,
        Self::SendEnabledPlayerDenominations,
        Self::SendTokenDenomination,
        Self::SendWagerCategoryInformation,
        Self::SendExtendedGameInformation,
        Self::SetMachineNumbers,
    ];

    /// Map a wire byte to its command code.
    ///
    /// # Errors
    /// Returns `Error::UnknownLongPoll` for codes outside the supported set.
    pub fn from_u8(code: u8) -> Result<Self> {
        match code {
            0x01 => Ok(Self::Shutdown),
            0x02 => Ok(Self::Startup),
            0x03 => Ok(Self::SoundOff),
            0x04 => Ok(Self::SoundOn),
            0x05 => Ok(Self::GameSoundsDisable),
            0x06 => Ok(Self::EnableBillAcceptor),
            0x07 => Ok(Self::DisableBillAcceptor),
            0x08 => Ok(Self::ConfigureBillDenominations),
            0x09 => Ok(Self::EnableDisableGameN),
            0x0A => Ok(Self::EnterMaintenanceMode),
            0x0B => Ok(Self::ExitMaintenanceMode),
            0x0E => Ok(Self::EnableRealTimeEvents),
            0x0F => Ok(Self::SendMeters10To15),
            0x10 => Ok(Self::SendCancelledCreditsMeter),
            0x11 => Ok(Self::SendCoinInMeter),
            0x12 => Ok(Self::SendCoinOutMeter),
            0x13 => Ok(Self::SendDropMeter),
            0x14 => Ok(Self::SendJackpotMeter),
            0x15 => Ok(Self::SendGamesPlayedMeter),
            0x16 => Ok(Self::SendGamesWonMeter),
            0x17 => Ok(Self::SendGamesLostMeter),
            0x18 => Ok(Self::SendGamesSincePowerUp),
            0x19 => Ok(Self::SendMeters11To15),
            0x1A => Ok(Self::SendCurrentCredits),
            0x1B => Ok(Self::SendHandpayInformation),
            0x1C => Ok(Self::SendMeters),
            0x1E => Ok(Self::SendBillMeters),
            0x1F => Ok(Self::SendMachineIdInformation),
            0x20 => Ok(Self::SendTotalBillsMeter),
            0x21 => Ok(Self::RomSignatureVerification),
            0x2A => Ok(Self::SendTrueCoinInMeter),
            0x2B => Ok(Self::SendTrueCoinOutMeter),
            0x2C => Ok(Self::SendHopperLevel),
            0x2D => Ok(Self::SendHandPaidCancelledCredits),
            0x2E => Ok(Self::DelayGame),
            0x2F => Ok(Self::SendSelectedMetersForGameN),
            0x31 => Ok(Self::SendOneDollarBillsMeter),
            0x32 => Ok(Self::SendTwoDollarBillsMeter),
            0x33 => Ok(Self::SendFiveDollarBillsMeter),
            0x34 => Ok(Self::SendTenDollarBillsMeter),
            0x35 => Ok(Self::SendTwentyDollarBillsMeter),
            0x36 => Ok(Self::SendFiftyDollarBillsMeter),
            0x37 => Ok(Self::SendHundredDollarBillsMeter),
            0x38 => Ok(Self::SendFiveHundredDollarBillsMeter),
            0x39 => Ok(Self::SendThousandDollarBillsMeter),
            0x3A => Ok(Self::SendTwoHundredDollarBillsMeter),
            0x3D => Ok(Self::SendCashOutTicketInformation),
            0x48 => Ok(Self::SendLastAcceptedBill),
            0x4C => Ok(Self::SetSecureEnhancedValidationId),
            0x4D => Ok(Self::SendEnhancedValidationInformation),
            0x50 => Ok(Self::SendValidationMeters),
            0x51 => Ok(Self::SendNumberOfGames),
            0x52 => Ok(Self::SendGameNMeters),
            0x53 => Ok(Self::SendGameNConfiguration),
            0x54 => Ok(Self::SendVersionAndSerialNumber),
            0x55 => Ok(Self::SendSelectedGameNumber),
            0x56 => Ok(Self::SendEnabledGameNumbers),
            0x57 => Ok(Self::SendPendingCashoutInformation),
            0x58 => Ok(Self::ReceiveValidationNumber),
            0x6F => Ok(Self::SendExtendedMetersForGameN),
            0x70 => Ok(Self::SendTicketValidationData),
            0x71 => Ok(Self::RedeemTicket),
            0x72 => Ok(Self::AftTransferFunds),
            0x73 => Ok(Self::AftRegisterGamingMachine),
            0x74 => Ok(Self::AftGameLockAndStatus),
            0x75 => Ok(Self::SetAftReceiptData),
            0x7B => Ok(Self::ExtendedValidationStatus),
            0x7C => Ok(Self::SetExtendedTicketData),
            0x7D => Ok(Self::SetTicketData),
            0x7E => Ok(Self::SendDateTime),
            0x7F => Ok(Self::ReceiveDateTime),
            0x80 => Ok(Self::ReceiveProgressiveAmount),
            0x83 => Ok(Self::SendCumulativeProgressiveWins),
            0x84 => Ok(Self::SendProgressiveWinAmount),
            0x85 => Ok(Self::SendSasProgressiveWinAmount),
            0x86 => Ok(Self::ReceiveMultipleProgressiveLevels),
            0x87 => Ok(Self::SendMultipleSasProgressiveWins),
            0x8A => Ok(Self::InitiateLegacyBonusPay),
            0x8E => Ok(Self::SendCardInformation),
            0x8F => Ok(Self::SendReelStopInformation),
            0x94 => Ok(Self::RemoteHandpayReset),
            0xA0 => Ok(Self::SendEnabledFeatures),
            0xA4 => Ok(Self::SendCashOutLimit),
            0xA8 => Ok(Self::EnableJackpotHandpayResetMethod),
            0xAA => Ok(Self::EnableAutoRebet),
            0xAF => Ok(Self::SendExtendedMetersForGameNAlt),
            0xB0 => Ok(Self::MultiDenomPreamble),
            0xB1 => Ok(Self::SendCurrentPlayerDenomination),
            0xB2 => Ok(Self::SendEnabledPlayerDenominations),
            0xB3 => Ok(Self::SendTokenDenomination),
            0xB4 => Ok(Self::SendWagerCategoryInformation),
            0xB5 => Ok(Self::SendExtendedGameInformation),
            0xB7 => Ok(Self::SetMachineNumbers),
            _ => Err(Error::UnknownLongPoll { code }),
        }
    }

    /// Wire byte of this command.
    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns `true` for the machine control polls (shutdown, startup, sound, bill acceptor, maintenance).
    ///
    /// # Example
    /// ```
    /// use sas_protocol::LongPollCode;
    ///
    /// assert!(LongPollCode::Shutdown.is_control());
    /// assert!(!LongPollCode::SendMeters.is_control());
    /// ```
    #[inline]
    pub fn is_control(self) -> bool {
        matches!(
            self,
            Self::Shutdown
                | Self::Startup
                | Self::SoundOff
                | Self::SoundOn
                | Self::GameSoundsDisable
                | Self::EnableBillAcceptor
                | Self::DisableBillAcceptor
                | Self::EnterMaintenanceMode
                | Self::ExitMaintenanceMode
        )
    }

    /// Returns `true` for polls that report meters.
    ///
    /// # Example
    /// ```
    /// use sas_protocol::LongPollCode;
    ///
    /// assert!(LongPollCode::SendCoinInMeter.is_meter());
    /// assert!(!LongPollCode::Shutdown.is_meter());
    /// ```
    #[inline]
    pub fn is_meter(self) -> bool {
        matches!(
            self,
            Self::SendMeters10To15
                | Self::SendCancelledCreditsMeter
                | Self::SendCoinInMeter
                | Self::SendCoinOutMeter
                | Self::SendDropMeter
                | Self::SendJackpotMeter
                | Self::SendGamesPlayedMeter
                | Self::SendGamesWonMeter
                | Self::SendGamesLostMeter
                | Self::SendGamesSincePowerUp
                | Self::SendMeters11To15
                | Self::SendCurrentCredits
                | Self::SendMeters
                | Self::SendBillMeters
                | Self::SendTotalBillsMeter
                | Self::SendTrueCoinInMeter
                | Self::SendTrueCoinOutMeter
                | Self::SendHopperLevel
                | Self::SendHandPaidCancelledCredits
                | Self::SendSelectedMetersForGameN
                | Self::SendOneDollarBillsMeter
                | Self::SendTwoDollarBillsMeter
                | Self::SendFiveDollarBillsMeter
                | Self::SendTenDollarBillsMeter
                | Self::SendTwentyDollarBillsMeter
                | Self::SendFiftyDollarBillsMeter
                | Self::SendHundredDollarBillsMeter
                | Self::SendFiveHundredDollarBillsMeter
                | Self::SendThousandDollarBillsMeter
                | Self::SendTwoHundredDollarBillsMeter
                | Self::SendGameNMeters
                | Self::SendExtendedMetersForGameN
                | Self::SendExtendedMetersForGameNAlt
        )
    }

    /// Returns `true` for polls that describe games and their configuration.
    ///
    /// # Example
    /// ```
    /// use sas_protocol::LongPollCode;
    ///
    /// assert!(LongPollCode::SendMachineIdInformation.is_game_information());
    /// assert!(!LongPollCode::SendCoinInMeter.is_game_information());
    /// ```
    #[inline]
    pub fn is_game_information(self) -> bool {
        matches!(
            self,
            Self::SendMachineIdInformation
                | Self::SendNumberOfGames
                | Self::SendGameNConfiguration
                | Self::SendSelectedGameNumber
                | Self::SendEnabledGameNumbers
                | Self::SendEnabledFeatures
                | Self::SendCashOutLimit
                | Self::SendWagerCategoryInformation
                | Self::SendExtendedGameInformation
        )
    }

    /// Returns `true` for ticketing and validation polls.
    ///
    /// # Example
    /// ```
    /// use sas_protocol::LongPollCode;
    ///
    /// assert!(LongPollCode::RedeemTicket.is_ticketing());
    /// assert!(!LongPollCode::AftTransferFunds.is_ticketing());
    /// ```
    #[inline]
    pub fn is_ticketing(self) -> bool {
        matches!(
            self,
            Self::SendCashOutTicketInformation
                | Self::SetSecureEnhancedValidationId
                | Self::SendEnhancedValidationInformation
                | Self::SendValidationMeters
                | Self::ReceiveValidationNumber
                | Self::SendTicketValidationData
                | Self::RedeemTicket
                | Self::ExtendedValidationStatus
                | Self::SetExtendedTicketData
                | Self::SetTicketData
        )
    }

    /// Returns `true` for advanced funds transfer polls.
    ///
    /// # Example
    /// ```
    /// use sas_protocol::LongPollCode;
    ///
    /// assert!(LongPollCode::AftRegisterGamingMachine.is_aft());
    /// assert!(!LongPollCode::RedeemTicket.is_aft());
    /// ```
    #[inline]
    pub fn is_aft(self) -> bool {
        matches!(
            self,
            Self::AftTransferFunds
                | Self::AftRegisterGamingMachine
                | Self::AftGameLockAndStatus
                | Self::SetAftReceiptData
        )
    }

    /// Returns `true` for progressive polls.
    ///
    /// # Example
    /// ```
    /// use sas_protocol::LongPollCode;
    ///
    /// assert!(LongPollCode::SendProgressiveWinAmount.is_progressive());
    /// assert!(!LongPollCode::SendDateTime.is_progressive());
    /// ```
    #[inline]
    pub fn is_progressive(self) -> bool {
        matches!(
            self,
            Self::ReceiveProgressiveAmount
                | Self::SendCumulativeProgressiveWins
                | Self::SendProgressiveWinAmount
                | Self::SendSasProgressiveWinAmount
                | Self::ReceiveMultipleProgressiveLevels
                | Self::SendMultipleSasProgressiveWins
        )
    }

    /// Returns `true` for polls that answer inside the multi-denomination preamble.
    ///
    /// # Example
    /// ```
    /// use sas_protocol::LongPollCode;
    ///
    /// assert!(LongPollCode::SendCoinInMeter.is_multi_denom_aware());
    /// assert!(!LongPollCode::SendDropMeter.is_multi_denom_aware());
    /// ```
    #[inline]
    pub fn is_multi_denom_aware(self) -> bool {
        matches!(
            self,
            Self::SendCancelledCreditsMeter
                | Self::SendCoinInMeter
                | Self::SendCoinOutMeter
                | Self::SendJackpotMeter
                | Self::SendGamesPlayedMeter
                | Self::SendGamesWonMeter
                | Self::SendGamesLostMeter
                | Self::SendCurrentCredits
                | Self::SendSelectedMetersForGameN
                | Self::SendGameNMeters
                | Self::SendGameNConfiguration
                | Self::SendEnabledGameNumbers
                | Self::SendExtendedMetersForGameN
                | Self::SendExtendedMetersForGameNAlt
                | Self::SendExtendedGameInformation
        )
    }

    /// Returns `true` if the poll is framed with a trailing CRC.
    ///
    /// Type R polls (plain reads with no request data) are sent as
    /// `[address, code]` only.
    ///
    /// # Example
    /// ```
    /// use sas_protocol::LongPollCode;
    ///
    /// assert!(LongPollCode::Shutdown.has_crc());
    /// assert!(LongPollCode::AftTransferFunds.has_crc());
    /// assert!(!LongPollCode::SendCoinInMeter.has_crc());
    /// ```
    #[inline]
    pub fn has_crc(self) -> bool {
        self.is_control() || self.has_request_data()
    }

    /// Returns `true` if the poll carries a payload after the command code.
    #[inline]
    pub fn has_request_data(self) -> bool {
        matches!(
            self,
            Self::ConfigureBillDenominations
                | Self::EnableDisableGameN
                | Self::EnableRealTimeEvents
                | Self::RomSignatureVerification
                | Self::SendHandPaidCancelledCredits
                | Self::DelayGame
                | Self::SendSelectedMetersForGameN
                | Self::SetSecureEnhancedValidationId
                | Self::SendEnhancedValidationInformation
                | Self::SendValidationMeters
                | Self::SendGameNMeters
                | Self::SendGameNConfiguration
                | Self::SendEnabledGameNumbers
                | Self::ReceiveValidationNumber
                | Self::SendExtendedMetersForGameN
                | Self::RedeemTicket
                | Self::AftTransferFunds
                | Self::AftRegisterGamingMachine
                | Self::AftGameLockAndStatus
                | Self::SetAftReceiptData
                | Self::ExtendedValidationStatus
                | Self::SetExtendedTicketData
                | Self::SetTicketData
                | Self::ReceiveDateTime
                | Self::ReceiveProgressiveAmount
                | Self::SendCumulativeProgressiveWins
                | Self::ReceiveMultipleProgressiveLevels
                | Self::InitiateLegacyBonusPay
                | Self::RemoteHandpayReset
                | Self::SendEnabledFeatures
                | Self::SendCashOutLimit
                | Self::EnableJackpotHandpayResetMethod
                | Self::EnableAutoRebet
                | Self::SendExtendedMetersForGameNAlt
                | Self::MultiDenomPreamble
                | Self::SendWagerCategoryInformation
                | Self::SendExtendedGameInformation
                | Self::SetMachineNumbers
        )
    }
}

impl fmt::Display for LongPollCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X} {:?}", self.as_u8(), self)
    }
}

impl TryFrom<u8> for LongPollCode {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        Self::from_u8(code)
    }
}

impl From<LongPollCode> for u8 {
    fn from(code: LongPollCode) -> Self {
        code.as_u8()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_all_round_trip() {
        for code in LongPollCode::ALL {
            assert_eq!(LongPollCode::from_u8(code.as_u8()).unwrap(), code);
        }
    }

    #[test]
    fn test_all_is_sorted_and_unique() {
        assert!(
            LongPollCode::ALL
                .windows(2)
                .all(|pair| pair[0].as_u8() < pair[1].as_u8())
        );
    }

    #[rstest]
    #[case(0x00)]
    #[case(0x0C)]
    #[case(0x1D)]
    #[case(0xFF)]
    fn test_unknown_codes(#[case] code: u8) {
        assert_eq!(
            LongPollCode::from_u8(code),
            Err(Error::UnknownLongPoll { code })
        );
    }

    #[rstest]
    #[case(LongPollCode::Shutdown, 0x01)]
    #[case(LongPollCode::EnableDisableGameN, 0x09)]
    #[case(LongPollCode::SendMachineIdInformation, 0x1F)]
    #[case(LongPollCode::SetSecureEnhancedValidationId, 0x4C)]
    #[case(LongPollCode::AftTransferFunds, 0x72)]
    #[case(LongPollCode::MultiDenomPreamble, 0xB0)]
    #[case(LongPollCode::SetMachineNumbers, 0xB7)]
    fn test_wire_values(#[case] code: LongPollCode, #[case] byte: u8) {
        assert_eq!(code.as_u8(), byte);
        assert_eq!(u8::from(code), byte);
        assert_eq!(LongPollCode::try_from(byte).unwrap(), code);
    }

    #[test]
    fn test_multi_denom_aware_set() {
        let aware: Vec<u8> = LongPollCode::ALL
            .iter()
            .filter(|code| code.is_multi_denom_aware())
            .map(|code| code.as_u8())
            .collect();
        assert_eq!(
            aware,
            vec![
                0x10, 0x11, 0x12, 0x14, 0x15, 0x16, 0x17, 0x1A, 0x2F, 0x52, 0x53, 0x56, 0x6F, 0xAF,
                0xB5
            ]
        );
    }

    #[test]
    fn test_categories_are_disjoint() {
        for code in LongPollCode::ALL {
            let hits = [
                code.is_control(),
                code.is_meter(),
                code.is_game_information(),
                code.is_ticketing(),
                code.is_aft(),
                code.is_progressive(),
            ]
            .iter()
            .filter(|hit| **hit)
            .count();
            assert!(hits <= 1, "{code} is in {hits} categories");
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(LongPollCode::Shutdown.to_string(), "0x01 Shutdown");
        assert_eq!(
            LongPollCode::MultiDenomPreamble.to_string(),
            "0xB0 MultiDenomPreamble"
        );
    }
}
