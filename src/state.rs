//! Application UI state
//!
//! A plain value updated by applying [`AppCommand`]s, plus
//! [`AppState::reconcile_selection`] which keeps the selected wallet
//! consistent with the wallet list whenever that list changes.

use std::collections::HashSet;

use crate::models::Wallet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub selected_wallet: Option<String>,
    pub is_edit_mode: bool,
    pub show_add_form: bool,
    pub is_syncing: bool,
    pub syncing_wallets: HashSet<String>,
    pub newly_added_wallets: HashSet<String>,
    /// Wallet to select as soon as it shows up in the list
    pub pending_wallet_selection: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    SetSelectedWallet(Option<String>),
    ToggleEditMode,
    SetEditMode(bool),
    SetShowAddForm(bool),
    SetIsSyncing(bool),
    AddSyncingWallet(String),
    RemoveSyncingWallet(String),
    AddNewlyAddedWallet(String),
    RemoveNewlyAddedWallet(String),
    SetPendingWalletSelection(Option<String>),
    ClearPendingWalletSelection,
}

impl AppState {
    pub fn apply(&mut self, command: AppCommand) {
        match command {
            AppCommand::SetSelectedWallet(wallet_id) => self.selected_wallet = wallet_id,
            AppCommand::ToggleEditMode => self.is_edit_mode = !self.is_edit_mode,
            AppCommand::SetEditMode(on) => self.is_edit_mode = on,
            AppCommand::SetShowAddForm(show) => self.show_add_form = show,
            AppCommand::SetIsSyncing(syncing) => self.is_syncing = syncing,
            AppCommand::AddSyncingWallet(wallet_id) => {
                self.syncing_wallets.insert(wallet_id);
            }
            AppCommand::RemoveSyncingWallet(wallet_id) => {
                self.syncing_wallets.remove(&wallet_id);
            }
            AppCommand::AddNewlyAddedWallet(wallet_id) => {
                self.newly_added_wallets.insert(wallet_id);
            }
            AppCommand::RemoveNewlyAddedWallet(wallet_id) => {
                self.newly_added_wallets.remove(&wallet_id);
            }
            AppCommand::SetPendingWalletSelection(wallet_id) => {
                self.pending_wallet_selection = wallet_id
            }
            AppCommand::ClearPendingWalletSelection => self.pending_wallet_selection = None,
        }
    }

    pub fn is_wallet_syncing(&self, wallet_id: &str) -> bool {
        self.syncing_wallets.contains(wallet_id)
    }

    pub fn is_newly_added(&self, wallet_id: &str) -> bool {
        self.newly_added_wallets.contains(wallet_id)
    }

    /// Bring the selection in line with the current wallet list.
    ///
    /// In order: a pending selection is applied once its wallet exists; with
    /// nothing selected or pending, the first wallet is selected after the
    /// list has loaded; a selection whose wallet vanished falls back to the
    /// first wallet. An empty list changes nothing. Returns whether the
    /// state changed.
    pub fn reconcile_selection(&mut self, wallets: &[Wallet], wallets_loading: bool) -> bool {
        let Some(first) = wallets.first() else {
            return false;
        };
        let before = (
            self.selected_wallet.clone(),
            self.pending_wallet_selection.clone(),
        );
        let exists = |id: &str| wallets.iter().any(|wallet| wallet.id == id);

        if let Some(pending) = self.pending_wallet_selection.clone() {
            if exists(&pending) {
                self.apply(AppCommand::SetSelectedWallet(Some(pending)));
                self.apply(AppCommand::ClearPendingWalletSelection);
            }
        }

        if !wallets_loading
            && self.selected_wallet.is_none()
            && self.pending_wallet_selection.is_none()
        {
            self.apply(AppCommand::SetSelectedWallet(Some(first.id.clone())));
        }

        let vanished = self
            .selected_wallet
            .as_deref()
            .is_some_and(|selected| !exists(selected));
        if vanished {
            self.apply(AppCommand::SetSelectedWallet(Some(first.id.clone())));
        }

        before
            != (
                self.selected_wallet.clone(),
                self.pending_wallet_selection.clone(),
            )
    }
}
