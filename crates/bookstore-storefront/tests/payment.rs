//! Mock gateway decisions as seen through checkout.

use bookstore_commerce::checkout::{CheckoutRequest, CheckoutStage, PaymentDetails, ShippingInfo};
use bookstore_commerce::CommerceError;
use bookstore_storefront::{StoreConfig, StoreError, Storefront};
use proptest::prelude::*;

fn store() -> Storefront {
    Storefront::new(&StoreConfig {
        seed_demo_account: false,
        ..StoreConfig::default()
    })
    .unwrap()
}

fn request(card_number: &str) -> CheckoutRequest {
    CheckoutRequest::new(
        ShippingInfo::new("Ada", "ada@example.com", "1 Main St", "Springfield", "12345"),
        PaymentDetails::credit_card(card_number, "12/27", "123"),
    )
}

proptest! {
    #[test]
    fn test_cards_ending_1111_are_declined(prefix in "[0-9]{0,12}") {
        let store = store();
        let session = store.open_session();
        store.add_to_cart(&session, "Moby Dick", "1").unwrap();

        let err = store.checkout(&session, &request(&format!("{prefix}1111"))).unwrap_err();
        match err {
            StoreError::Checkout(failure) => {
                prop_assert_eq!(failure.stage, CheckoutStage::Authorization);
                prop_assert!(matches!(failure.error, CommerceError::PaymentDeclined(_)));
            }
            other => prop_assert!(false, "unexpected error: {:?}", other),
        }
        prop_assert_eq!(store.cart(&session).unwrap().item_count, 1);
        prop_assert_eq!(store.order_count(), 0);
    }

    #[test]
    fn test_other_cards_are_approved(number in "[0-9]{4,16}") {
        prop_assume!(!number.ends_with("1111"));
        let store = store();
        let session = store.open_session();
        store.add_to_cart(&session, "1984", "3").unwrap();

        let receipt = store.checkout(&session, &request(&number)).unwrap();
        prop_assert_eq!(receipt.order.total.display(), "$26.97");
        prop_assert!(store.cart(&session).unwrap().is_empty());
    }
}
