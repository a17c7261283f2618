//! Parser registry.
//!
//! The registry maps each command code to the one parser that answers it.
//! Codes nobody registered are answered with a NACK; the 0xB0 preamble is
//! routed to [`MultiDenomPreamble`], which resolves its inner command through
//! the same registry.
//!
//! [`ParserRegistry::standard`] is the complete table of supported commands,
//! one entry per code, built from a [`SasHandlers`] set. Commands without a
//! handler are left out and therefore NACKed.
//!
//! ```
//! use std::sync::Arc;
//! use sas_core::SasClientConfig;
//! use sas_protocol::registry::{ParserRegistry, SasHandlers};
//! use sas_protocol::parsers::ControlRequest;
//!
//! let handlers = SasHandlers {
//!     control: Some(Arc::new(|_: ControlRequest| Some(true))),
//!     ..SasHandlers::default()
//! };
//! let registry = ParserRegistry::standard(&SasClientConfig::default(), handlers).unwrap();
//!
//! assert_eq!(registry.process(&[0x01, 0x02]).as_bytes(), &[0x01]);
//! assert_eq!(registry.process(&[0x01, 0x1F]).as_bytes(), &[0x81]);
//! ```

use crate::{
    commands::LongPollCode,
    field::TaggedRecords,
    frame::{LongPoll, Reply},
    handler::SharedHandler,
    multi_denom::MultiDenomPreamble,
    parser::{LongPollParser, UnhandledParser},
    parsers::*,
};
use chrono::NaiveDateTime;
use sas_core::{Denomination, Error, Result, SasClientConfig};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Command code to parser table.
#[derive(Default)]
pub struct ParserRegistry {
    parsers: BTreeMap<u8, Box<dyn LongPollParser>>,
    preamble: MultiDenomPreamble,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the 0xB0 preamble dispatcher.
    pub fn set_preamble(&mut self, preamble: MultiDenomPreamble) {
        self.preamble = preamble;
    }

    /// Add a parser.
    ///
    /// # Errors
    /// Returns `Error::DuplicateParser` if a parser for the same code is
    /// already registered.
    pub fn register<P>(&mut self, parser: P) -> Result<()>
    where
        P: LongPollParser + 'static,
    {
        let code = parser.command().as_u8();
        if self.parsers.contains_key(&code) {
            return Err(Error::DuplicateParser { code });
        }
        trace!(command = %parser.command(), "Registered parser");
        self.parsers.insert(code, Box::new(parser));
        Ok(())
    }

    /// Parser registered for `code`.
    pub fn get_parser(&self, code: u8) -> Option<&dyn LongPollParser> {
        self.parsers.get(&code).map(|parser| parser.as_ref())
    }

    /// Answer one long poll.
    pub fn dispatch(&self, poll: &LongPoll<'_>) -> Reply {
        trace!(
            address = poll.address(),
            code = poll.command_code(),
            length = poll.payload().len(),
            "Dispatching long poll"
        );

        if poll.command_code() == LongPollCode::MultiDenomPreamble.as_u8() {
            return self.preamble.parse(poll, self);
        }
        match self.get_parser(poll.command_code()) {
            Some(parser) => parser.parse(poll),
            None => UnhandledParser.parse(poll),
        }
    }

    /// Answer a raw `[address, code, payload...]` frame, CRC already removed.
    ///
    /// A frame too short to carry an address gets no reply.
    pub fn process(&self, bytes: &[u8]) -> Reply {
        match LongPoll::from_bytes(bytes) {
            Ok(poll) => self.dispatch(&poll),
            Err(error) => {
                debug!(%error, "Dropping frame without address and command");
                Reply::NoReply
            }
        }
    }

    /// Registered commands in code order, the preamble included.
    pub fn supported_commands(&self) -> Vec<LongPollCode> {
        let mut commands: Vec<LongPollCode> = self
            .parsers
            .values()
            .map(|parser| parser.command())
            .collect();
        commands.push(LongPollCode::MultiDenomPreamble);
        commands.sort();
        commands
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

/// Handlers for the standard registry. `None` leaves the command out.
#[derive(Clone, Default)]
pub struct SasHandlers {
    // Control and configuration
    pub control: Option<SharedHandler<ControlRequest, bool>>,
    pub bill_denominations: Option<SharedHandler<BillDenominationRequest, bool>>,
    pub game_enable: Option<SharedHandler<GameEnableRequest, GameEnableStatus>>,
    pub real_time_events: Option<SharedHandler<FlagRequest, bool>>,
    pub auto_rebet: Option<SharedHandler<FlagRequest, bool>>,
    pub delay_game: Option<SharedHandler<DelayGameRequest, bool>>,
    pub receive_date_time: Option<SharedHandler<NaiveDateTime, bool>>,
    pub legacy_bonus: Option<SharedHandler<LegacyBonusRequest, bool>>,
    pub jackpot_reset_method: Option<SharedHandler<HandpayResetMethod, ResetMethodAck>>,

    // Meters
    pub meters: Option<MeterHandler>,

    // Game information
    pub machine_id: Option<SharedHandler<(), GameConfiguration>>,
    pub game_configuration: Option<SharedHandler<GameRequest, GameConfiguration>>,
    pub number_of_games: Option<SharedHandler<(), u16>>,
    pub selected_game: Option<SharedHandler<(), u16>>,
    pub enabled_games: Option<SharedHandler<Option<Denomination>, Vec<u16>>>,
    pub enabled_features: Option<SharedHandler<GameRequest, EnabledFeatures>>,
    pub cash_out_limit: Option<SharedHandler<GameRequest, u16>>,
    pub wager_category: Option<SharedHandler<WagerCategoryRequest, WagerCategoryInfo>>,
    pub extended_game_info: Option<SharedHandler<GameRequest, ExtendedGameInfo>>,

    // Machine information and events
    pub handpay_info: Option<SharedHandler<(), HandpayInfo>>,
    pub rom_signature: Option<SharedHandler<u16, u16>>,
    pub last_accepted_bill: Option<SharedHandler<(), LastAcceptedBill>>,
    pub serial_number: Option<SharedHandler<(), String>>,
    pub pending_cashout: Option<SharedHandler<(), PendingCashout>>,
    pub date_time: Option<SharedHandler<(), NaiveDateTime>>,
    pub card_info: Option<SharedHandler<(), CardInfo>>,
    pub reel_stops: Option<SharedHandler<(), [u8; 9]>>,
    pub remote_handpay_reset: Option<SharedHandler<(), HandpayResetStatus>>,

    // Progressives
    pub progressive_amount: Option<SharedHandler<ProgressiveAmount, bool>>,
    pub progressive_levels: Option<SharedHandler<ProgressiveLevels, bool>>,
    pub cumulative_progressive_wins: Option<SharedHandler<u16, u64>>,
    pub progressive_win: Option<SharedHandler<(), ProgressiveWin>>,
    pub sas_progressive_win: Option<SharedHandler<(), ProgressiveWin>>,
    pub multiple_progressive_wins: Option<SharedHandler<(), ProgressiveLevels>>,

    // Ticketing and validation
    pub cash_out_ticket: Option<SharedHandler<(), CashOutTicket>>,
    pub secure_validation_id: Option<SharedHandler<SecureValidationId, SecureValidationId>>,
    pub enhanced_validation: Option<SharedHandler<ValidationRecordQuery, ValidationRecord>>,
    pub validation_meters: Option<SharedHandler<u8, ValidationMeters>>,
    pub validation_number: Option<SharedHandler<HostValidation, ValidationNumberStatus>>,
    pub ticket_validation_data: Option<SharedHandler<(), TicketValidationData>>,
    pub redeem_ticket: Option<SharedHandler<RedeemTicketRequest, RedemptionStatus>>,
    pub extended_validation_status:
        Option<SharedHandler<ExtendedValidationUpdate, ExtendedValidationConfig>>,
    pub extended_ticket_data: Option<SharedHandler<TaggedRecords, bool>>,
    pub ticket_data: Option<SharedHandler<SetTicketDataRequest, bool>>,

    // AFT
    pub aft_transfer: Option<SharedHandler<AftTransferRequest, AftTransferStatus>>,
    pub aft_registration: Option<SharedHandler<AftRegistrationRequest, AftRegistrationStatus>>,
    pub aft_lock_status: Option<SharedHandler<AftLockRequest, AftGameStatus>>,
    pub aft_receipt_data: Option<SharedHandler<TaggedRecords, bool>>,

    // Denominations
    pub player_denomination: Option<SharedHandler<(), Denomination>>,
    /// Also restricts the denominations the 0xB0 preamble accepts
    pub enabled_player_denominations: Option<SharedHandler<(), Vec<Denomination>>>,
    pub token_denomination: Option<SharedHandler<(), Denomination>>,
    pub machine_numbers: Option<SharedHandler<MachineNumbersRequest, MachineNumbers>>,
}

impl ParserRegistry {
    /// Build the standard command table.
    ///
    /// # Errors
    /// Returns `Error::Config` if `config` does not validate.
    pub fn standard(config: &SasClientConfig, handlers: SasHandlers) -> Result<Self> {
        config.validate()?;
        let mut registry = ParserRegistry::new();

        if let Some(handler) = handlers.control {
            for command in ControlParser::COMMANDS {
                let parser = ControlParser::new(command, config.client_number, handler.clone());
                registry.register(parser)?;
            }
        }
        if let Some(handler) = handlers.bill_denominations {
            registry.register(BillDenominationsParser::new(handler))?;
        }
        if let Some(handler) = handlers.game_enable {
            registry.register(GameEnableParser::new(handler))?;
        }
        if let Some(handler) = handlers.real_time_events {
            registry.register(FlagParser::new(LongPollCode::EnableRealTimeEvents, handler))?;
        }
        if let Some(handler) = handlers.auto_rebet {
            registry.register(FlagParser::new(LongPollCode::EnableAutoRebet, handler))?;
        }
        if let Some(handler) = handlers.delay_game {
            registry.register(DelayGameParser::new(handler))?;
        }
        if let Some(handler) = handlers.receive_date_time {
            registry.register(ReceiveDateTimeParser::new(handler))?;
        }
        if let Some(handler) = handlers.legacy_bonus {
            registry.register(LegacyBonusParser::new(handler))?;
        }
        if let Some(handler) = handlers.jackpot_reset_method {
            registry.register(JackpotResetMethodParser::new(handler))?;
        }

        if let Some(handler) = handlers.meters {
            for (command, meter) in SINGLE_METER_POLLS {
                registry.register(SingleMeterParser::new(command, meter, handler.clone()))?;
            }
            for command in METER_GROUP_POLLS {
                if let Some(parser) = MeterGroupParser::for_command(command, handler.clone()) {
                    registry.register(parser)?;
                }
            }
            registry.register(HandPaidCancelledCreditsParser::new(handler.clone()))?;
            registry.register(GameMetersParser::new(handler.clone()))?;
            registry.register(SelectedMetersParser::new(handler.clone()))?;
            registry.register(ExtendedMetersParser::new(
                LongPollCode::SendExtendedMetersForGameN,
                handler.clone(),
            ))?;
            registry.register(ExtendedMetersParser::new(
                LongPollCode::SendExtendedMetersForGameNAlt,
                handler,
            ))?;
        }

        if let Some(handler) = handlers.machine_id {
            registry.register(MachineIdParser::new(config.accounting_denomination, handler))?;
        }
        if let Some(handler) = handlers.game_configuration {
            registry.register(GameConfigurationParser::new(handler))?;
        }
        if let Some(handler) = handlers.number_of_games {
            registry.register(GameNumberParser::new(LongPollCode::SendNumberOfGames, handler))?;
        }
        if let Some(handler) = handlers.selected_game {
            registry.register(GameNumberParser::new(
                LongPollCode::SendSelectedGameNumber,
                handler,
            ))?;
        }
        if let Some(handler) = handlers.enabled_games {
            registry.register(EnabledGamesParser::new(handler))?;
        }
        if let Some(handler) = handlers.enabled_features {
            registry.register(EnabledFeaturesParser::new(handler))?;
        }
        if let Some(handler) = handlers.cash_out_limit {
            registry.register(CashOutLimitParser::new(handler))?;
        }
        if let Some(handler) = handlers.wager_category {
            registry.register(WagerCategoryParser::new(handler))?;
        }
        if let Some(handler) = handlers.extended_game_info {
            registry.register(ExtendedGameInfoParser::new(handler))?;
        }

        if let Some(handler) = handlers.handpay_info {
            registry.register(HandpayInfoParser::new(handler))?;
        }
        if let Some(handler) = handlers.rom_signature {
            registry.register(RomSignatureParser::new(handler))?;
        }
        if let Some(handler) = handlers.last_accepted_bill {
            registry.register(LastAcceptedBillParser::new(handler))?;
        }
        if let Some(handler) = handlers.serial_number {
            registry.register(VersionAndSerialParser::new(config.sas_version.clone(), handler))?;
        }
        if let Some(handler) = handlers.pending_cashout {
            registry.register(PendingCashoutParser::new(handler))?;
        }
        if let Some(handler) = handlers.date_time {
            registry.register(SendDateTimeParser::new(handler))?;
        }
        if let Some(handler) = handlers.card_info {
            registry.register(CardInfoParser::new(handler))?;
        }
        if let Some(handler) = handlers.reel_stops {
            registry.register(ReelStopParser::new(handler))?;
        }
        if let Some(handler) = handlers.remote_handpay_reset {
            registry.register(RemoteHandpayResetParser::new(handler))?;
        }

        if let Some(handler) = handlers.progressive_amount {
            registry.register(ProgressiveAmountParser::new(handler))?;
        }
        if let Some(handler) = handlers.progressive_levels {
            registry.register(MultipleLevelsParser::new(handler))?;
        }
        if let Some(handler) = handlers.cumulative_progressive_wins {
            registry.register(CumulativeWinsParser::new(handler))?;
        }
        if let Some(handler) = handlers.progressive_win {
            registry.register(ProgressiveWinParser::new(
                LongPollCode::SendProgressiveWinAmount,
                handler,
            ))?;
        }
        if let Some(handler) = handlers.sas_progressive_win {
            registry.register(ProgressiveWinParser::new(
                LongPollCode::SendSasProgressiveWinAmount,
                handler,
            ))?;
        }
        if let Some(handler) = handlers.multiple_progressive_wins {
            registry.register(MultipleWinsParser::new(handler))?;
        }

        if let Some(handler) = handlers.cash_out_ticket {
            registry.register(CashOutTicketParser::new(handler))?;
        }
        if let Some(handler) = handlers.secure_validation_id {
            registry.register(SecureValidationIdParser::new(handler))?;
        }
        if let Some(handler) = handlers.enhanced_validation {
            registry.register(EnhancedValidationParser::new(handler))?;
        }
        if let Some(handler) = handlers.validation_meters {
            registry.register(ValidationMetersParser::new(handler))?;
        }
        if let Some(handler) = handlers.validation_number {
            registry.register(ReceiveValidationNumberParser::new(handler))?;
        }
        if let Some(handler) = handlers.ticket_validation_data {
            registry.register(TicketValidationDataParser::new(handler))?;
        }
        if let Some(handler) = handlers.redeem_ticket {
            registry.register(RedeemTicketParser::new(handler))?;
        }
        if let Some(handler) = handlers.extended_validation_status {
            registry.register(ExtendedValidationStatusParser::new(config.asset_number, handler))?;
        }
        if let Some(handler) = handlers.extended_ticket_data {
            registry.register(ExtendedTicketDataParser::new(handler))?;
        }
        if let Some(handler) = handlers.ticket_data {
            registry.register(SetTicketDataParser::new(handler))?;
        }

        if let Some(handler) = handlers.aft_transfer {
            registry.register(AftTransferParser::new(handler))?;
        }
        if let Some(handler) = handlers.aft_registration {
            registry.register(AftRegistrationParser::new(config.asset_number, handler))?;
        }
        if let Some(handler) = handlers.aft_lock_status {
            registry.register(AftLockStatusParser::new(config.asset_number, handler))?;
        }
        if let Some(handler) = handlers.aft_receipt_data {
            registry.register(AftReceiptDataParser::new(handler))?;
        }

        if let Some(handler) = handlers.player_denomination {
            registry.register(DenominationParser::new(
                LongPollCode::SendCurrentPlayerDenomination,
                handler,
            ))?;
        }
        if let Some(handler) = handlers.enabled_player_denominations {
            registry.set_preamble(MultiDenomPreamble::with_player_denominations(handler.clone()));
            registry.register(EnabledDenominationsParser::new(handler))?;
        }
        if let Some(handler) = handlers.token_denomination {
            registry.register(DenominationParser::new(LongPollCode::SendTokenDenomination, handler))?;
        }
        if let Some(handler) = handlers.machine_numbers {
            registry.register(MachineNumbersParser::new(handler))?;
        }

        debug!(
            address = config.address,
            client = config.client_number,
            parsers = registry.len(),
            "Built long poll registry"
        );
        Ok(registry)
    }
}
